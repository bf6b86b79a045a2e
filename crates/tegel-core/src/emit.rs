//! Terminal emission of the declaration and definition artifacts.
//!
//! Output is byte-exact: every fragment is either a literal or one of the
//! component-name casings, and the generated files are expected to compile as a
//! starting point. The declaration lists visitor methods sorted by node name; the
//! definition emits their bodies in input order, separated by one blank line.

use crate::casing;
use crate::cursor::positioned;
use crate::error::Result;
use crate::params::{keys, Params};
use crate::sink::OutputSink;
use crate::vocabulary;

const STANDARD_INCLUDES: &str = "\
#include <sstream>
#include <string>

using namespace std;

#include \"ast.hpp\"
#include \"backend.hpp\"
#include \"common.hpp\"
#include \"data.hpp\"
#include \"type.hpp\"
";

/// Parameters read by [`emit_declaration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationParams {
    pub name: String,
    pub ast_visitor: bool,
    pub nodes: Vec<String>,
    pub guard: String,
}

impl DeclarationParams {
    pub fn from_params(params: &Params) -> Result<Self> {
        Ok(Self {
            name: params.str(keys::NAME)?.to_string(),
            ast_visitor: params.bool(keys::AST_VISITOR)?,
            nodes: params.list(keys::NODES)?.to_vec(),
            guard: params.str(keys::GUARD)?.to_string(),
        })
    }
}

/// Parameters read by [`emit_definition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionParams {
    pub name: String,
    pub ast_visitor: bool,
    pub nodes: Vec<String>,
    pub header: String,
}

impl DefinitionParams {
    pub fn from_params(params: &Params) -> Result<Self> {
        Ok(Self {
            name: params.str(keys::NAME)?.to_string(),
            ast_visitor: params.bool(keys::AST_VISITOR)?,
            nodes: params.list(keys::NODES)?.to_vec(),
            header: params.str(keys::HEADER)?.to_string(),
        })
    }
}

/// Write the declaration artifact: include guard, namespace, optional visitor
/// class and the two backend classes.
pub fn emit_declaration(p: &DeclarationParams, sink: &mut dyn OutputSink) -> Result<()> {
    let title = casing::title(&p.name);
    let namespace = casing::lower(&p.name);

    sink.append(&format!("#ifndef {0}\n#define {0}\n\n", p.guard))?;
    sink.append(STANDARD_INCLUDES)?;
    sink.append(&format!("\nnamespace {namespace}_backend\n{{\n"))?;

    if p.ast_visitor {
        sink.append(&format!(
            "    class {title}Body : public ast::AST_Visitor\n    {{\n        public:\n"
        ))?;
        for node in vocabulary::sorted(&p.nodes) {
            sink.append(&format!("            virtual void visit(ast::{node} *);\n"))?;
        }
        sink.append("    };\n")?;
    }

    sink.append(&format!(
        "\n    class {title}Backend : public Backend\n    {{\n        public:\n"
    ))?;
    sink.append("            void generate(ostream &, const vector<symbol::Argument *> &,\n")?;
    sink.append("                          ast::Statements *);\n")?;
    sink.append("    };\n")?;

    sink.append(&format!(
        "\n    class {title}TgpBackend : public TgpBackend\n    {{\n        public:\n"
    ))?;
    sink.append(
        "            void generate(ostream &, ParseData *, map<string, ParseData *> &);\n",
    )?;
    sink.append("    };\n")?;

    sink.append("}\n\n#endif\n")
}

/// Write the definition artifact: include of the paired header, optional visitor
/// method bodies and the two backend entry points.
pub fn emit_definition(p: &DefinitionParams, sink: &mut dyn OutputSink) -> Result<()> {
    let title = casing::title(&p.name);
    let namespace = casing::lower(&p.name);

    sink.append(&format!("#include \"{}\"\n\n", p.header))?;

    if p.ast_visitor {
        sink.append("/*\n *\n */\n")?;
        sink.append(&format!("namespace {namespace}_backend\n{{\n"))?;
        for (pos, node) in positioned(&p.nodes) {
            sink.append(&format!(
                "    void {title}Body::visit(ast::{node} *)\n    {{\n\n    }}\n"
            ))?;
            if !pos.last {
                sink.append("\n")?;
            }
        }
        sink.append("}\n")?;
    }

    sink.append(&format!("\nnamespace {namespace}_backend\n{{\n"))?;
    sink.append(&format!("    void {title}Backend::generate(ostream &os,\n"))?;
    sink.append("                             const vector<symbol::Argument *> &args,\n")?;
    sink.append("                             ast::Statements *body)\n")?;
    sink.append("    {\n\n    }\n\n")?;
    sink.append(&format!(
        "    void {title}TgpBackend::generate(ostream &os, ParseData *tgp_data,\n"
    ))?;
    sink.append("                                map<string, ParseData *> &tgl_data)\n")?;
    sink.append("    {\n\n    }\n")?;
    sink.append("}\n")
}
