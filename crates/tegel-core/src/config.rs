//! Generator configuration file (`tegel.config.json`).
//!
//! Every field is optional; command-line flags take precedence over the file and
//! the file takes precedence over built-in defaults.
//!
//! ```json
//! {
//!   "name": "expr",
//!   "ast_visitor": true,
//!   "output_directory": "src/backends",
//!   "nodes": ["Plus", "Minus"],
//!   "declaration_ext": "hpp",
//!   "definition_ext": "cpp"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TegelError};
use crate::params::BackendRequest;
use crate::vocabulary;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "tegel.config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Component name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Emit the dispatch visitor.
    #[serde(default)]
    pub ast_visitor: bool,
    /// Directory the artifacts are written to; created if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,
    /// Node names, replacing the built-in vocabulary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<String>>,
    #[serde(default = "default_declaration_ext")]
    pub declaration_ext: String,
    #[serde(default = "default_definition_ext")]
    pub definition_ext: String,
}

fn default_declaration_ext() -> String {
    BackendRequest::DEFAULT_DECLARATION_EXT.into()
}

fn default_definition_ext() -> String {
    BackendRequest::DEFAULT_DEFINITION_EXT.into()
}

impl GeneratorConfig {
    /// Built-in defaults with the full vocabulary spelled out, as written by
    /// `tegel config --write`.
    pub fn starter() -> Self {
        Self {
            name: None,
            ast_visitor: false,
            output_directory: None,
            nodes: Some(vocabulary::default_nodes()),
            declaration_ext: default_declaration_ext(),
            definition_ext: default_definition_ext(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| TegelError::ConfigNotFound {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&contents).map_err(|source| TegelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self {
                declaration_ext: default_declaration_ext(),
                definition_ext: default_definition_ext(),
                ..Self::default()
            })
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| TegelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json + "\n")?;
        Ok(())
    }

    /// Output directory, defaulting to the current directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Build the backend request. A missing name is an `InvalidParameter`.
    pub fn to_request(&self) -> Result<BackendRequest> {
        let name = self.name.clone().ok_or_else(|| TegelError::InvalidParameter {
            name: "name".into(),
            reason: "no component name given (use -n or set \"name\" in the config)".into(),
        })?;
        let mut request = BackendRequest::new(name)
            .with_ast_visitor(self.ast_visitor)
            .with_extensions(&self.declaration_ext, &self.definition_ext);
        if let Some(nodes) = &self.nodes {
            request = request.with_nodes(nodes.iter().cloned());
        }
        request.validate()?;
        Ok(request)
    }
}
