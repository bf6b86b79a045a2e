//! Parameter mappings passed between dispatcher invocations.
//!
//! A [`Params`] is built once by the caller and never mutated afterwards. The
//! orchestrator produces a fresh mapping for each artifact with [`Params::derive`],
//! keeping only the keys the terminal routine reads and overlaying derived values.
//!
//! [`BackendRequest`] is the typed, validated form of the root mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TegelError};
use crate::vocabulary;

/// Well-known parameter names.
pub mod keys {
    pub const NAME: &str = "name";
    pub const AST_VISITOR: &str = "ast_visitor";
    pub const NODES: &str = "nodes";
    pub const DECLARATION_EXT: &str = "declaration_ext";
    pub const DEFINITION_EXT: &str = "definition_ext";
    /// Include-guard macro, derived for the declaration artifact.
    pub const GUARD: &str = "guard";
    /// Paired declaration file name, derived for the definition artifact.
    pub const HEADER: &str = "header";
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Str(String),
    List(Vec<String>),
    Records(Vec<BTreeMap<String, ParamValue>>),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Str(_) => "string",
            Self::List(_) => "list of strings",
            Self::Records(_) => "list of records",
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Str(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Self::Records(records) => Value::Array(
                records
                    .iter()
                    .map(|r| {
                        Value::Object(r.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
                    })
                    .collect(),
            ),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Immutable mapping from parameter name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn require(&self, key: &str) -> Result<&ParamValue> {
        self.get(key)
            .ok_or_else(|| TegelError::invalid(key, "required parameter is missing"))
    }

    fn wrong_kind(key: &str, expected: &str, found: &ParamValue) -> TegelError {
        TegelError::invalid(key, format!("expected {expected}, found {}", found.kind()))
    }

    pub fn str(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            ParamValue::Str(s) => Ok(s),
            other => Err(Self::wrong_kind(key, "string", other)),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool> {
        match self.require(key)? {
            ParamValue::Bool(b) => Ok(*b),
            other => Err(Self::wrong_kind(key, "boolean", other)),
        }
    }

    /// Like [`bool`](Self::bool), but an absent key yields `default`.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        if self.contains(key) {
            self.bool(key)
        } else {
            Ok(default)
        }
    }

    pub fn list(&self, key: &str) -> Result<&[String]> {
        match self.require(key)? {
            ParamValue::List(items) => Ok(items),
            other => Err(Self::wrong_kind(key, "list of strings", other)),
        }
    }

    /// Build a new mapping from the listed `keys` of this one, then overlay `overrides`.
    ///
    /// Keys absent from `self` are skipped; overrides always win.
    pub fn derive<I>(&self, keys: &[&str], overrides: I) -> Params
    where
        I: IntoIterator<Item = (String, ParamValue)>,
    {
        let mut map: BTreeMap<String, ParamValue> = keys
            .iter()
            .filter_map(|k| self.0.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect();
        map.extend(overrides);
        Params(map)
    }

    /// JSON object view, used as the rendering context for derived names.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

/// Accumulates values before freezing them into a [`Params`].
#[derive(Debug, Default)]
pub struct ParamsBuilder {
    map: BTreeMap<String, ParamValue>,
}

impl ParamsBuilder {
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.map.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Params {
        Params(self.map)
    }
}

/// The root request for one backend skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    /// Component name, used verbatim, lowercased and title-cased.
    pub name: String,
    /// Emit the dispatch visitor class and its method bodies.
    pub ast_visitor: bool,
    /// Node names, in the order the definition artifact emits them.
    pub nodes: Vec<String>,
    pub declaration_ext: String,
    pub definition_ext: String,
}

impl BackendRequest {
    pub const DEFAULT_DECLARATION_EXT: &'static str = "hpp";
    pub const DEFAULT_DEFINITION_EXT: &'static str = "cpp";

    /// A request with the default vocabulary, no visitor and `hpp`/`cpp` extensions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ast_visitor: false,
            nodes: vocabulary::default_nodes(),
            declaration_ext: Self::DEFAULT_DECLARATION_EXT.into(),
            definition_ext: Self::DEFAULT_DEFINITION_EXT.into(),
        }
    }

    pub fn with_ast_visitor(mut self, ast_visitor: bool) -> Self {
        self.ast_visitor = ast_visitor;
        self
    }

    pub fn with_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extensions(
        mut self,
        declaration_ext: impl Into<String>,
        definition_ext: impl Into<String>,
    ) -> Self {
        self.declaration_ext = declaration_ext.into();
        self.definition_ext = definition_ext.into();
        self
    }

    /// Check every field before any artifact is opened.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(TegelError::invalid(keys::NAME, "component name must not be empty"));
        }
        if self
            .name
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(TegelError::invalid(
                keys::NAME,
                format!(
                    "'{}' must not contain whitespace or path separators",
                    self.name
                ),
            ));
        }
        // Casings are applied per ASCII letter in every artifact.
        if !self.name.is_ascii() {
            return Err(TegelError::invalid(
                keys::NAME,
                format!("'{}' must be ASCII", self.name),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if !vocabulary::is_identifier(node) {
                return Err(TegelError::invalid(
                    keys::NODES,
                    format!("'{node}' is not a valid identifier"),
                ));
            }
            if !seen.insert(node.as_str()) {
                return Err(TegelError::invalid(
                    keys::NODES,
                    format!("'{node}' is listed more than once"),
                ));
            }
        }

        for (key, ext) in [
            (keys::DECLARATION_EXT, &self.declaration_ext),
            (keys::DEFINITION_EXT, &self.definition_ext),
        ] {
            if ext.is_empty() || ext.contains(['.', '/', '\\']) {
                return Err(TegelError::invalid(
                    key,
                    format!("'{ext}' is not a bare file extension"),
                ));
            }
        }

        Ok(())
    }

    /// Validate and convert into the root parameter mapping.
    pub fn into_params(self) -> Result<Params> {
        self.validate()?;
        Ok(Params::builder()
            .set(keys::NAME, self.name)
            .set(keys::AST_VISITOR, self.ast_visitor)
            .set(keys::NODES, self.nodes)
            .set(keys::DECLARATION_EXT, self.declaration_ext)
            .set(keys::DEFINITION_EXT, self.definition_ext)
            .build())
    }

    /// Read a request back from a root mapping, applying defaults for optional keys.
    pub fn from_params(params: &Params) -> Result<Self> {
        let mut request = Self::new(params.str(keys::NAME)?)
            .with_ast_visitor(params.bool_or(keys::AST_VISITOR, false)?);
        if params.contains(keys::NODES) {
            request.nodes = params.list(keys::NODES)?.to_vec();
        }
        if params.contains(keys::DECLARATION_EXT) {
            request.declaration_ext = params.str(keys::DECLARATION_EXT)?.to_string();
        }
        if params.contains(keys::DEFINITION_EXT) {
            request.definition_ext = params.str(keys::DEFINITION_EXT)?.to_string();
        }
        Ok(request)
    }
}
