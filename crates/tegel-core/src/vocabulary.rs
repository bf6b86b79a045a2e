//! The node-name vocabulary a generated visitor dispatches over.

/// Every AST node kind of the template language, in declaration order.
///
/// The definition artifact emits method bodies in this order; the declaration
/// artifact emits the same names sorted.
pub const AST_NODES: &[&str] = &[
    "Statements",
    "TernaryIf",
    "And",
    "Or",
    "Not",
    "BoolEquals",
    "LessThan",
    "LessThanOrEqual",
    "GreaterThan",
    "GreaterThanOrEqual",
    "Equals",
    "Plus",
    "Minus",
    "Times",
    "StringLessThan",
    "StringLessThanOrEqual",
    "StringGreaterThan",
    "StringGreaterThanOrEqual",
    "StringEquals",
    "StringRepeat",
    "StringConcat",
    "ListConcat",
    "Constant",
    "MethodCall",
    "SymbolRef",
    "FieldRef",
    "List",
    "Record",
    "FunctionCall",
    "ExpressionList",
    "LambdaExpression",
    "FuncArg",
    "FuncArgExpression",
    "FuncArgLambda",
    "FuncArgList",
    "Conditional",
    "Scope",
    "ForEach",
    "ForEachEnum",
    "If",
    "Elif",
    "Else",
    "Text",
    "InlinedExpression",
    "VariableStatement",
    "VariableList",
    "VariableDeclaration",
    "VariableAssignment",
    "Create",
];

/// The default vocabulary as owned strings.
pub fn default_nodes() -> Vec<String> {
    AST_NODES.iter().map(|n| n.to_string()).collect()
}

/// Ascending, byte-wise sorted copy of `nodes`.
pub fn sorted<S: AsRef<str>>(nodes: &[S]) -> Vec<&str> {
    let mut out: Vec<&str> = nodes.iter().map(|n| n.as_ref()).collect();
    out.sort_unstable();
    out
}

/// Whether `name` is usable as a C++ class name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
