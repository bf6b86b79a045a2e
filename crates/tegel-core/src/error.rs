//! Unified error types for the tegel generator.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while generating backend skeletons.
#[derive(Error, Debug)]
pub enum TegelError {
    // --- Parameters ---

    /// A required parameter is missing, has the wrong kind, or is malformed.
    ///
    /// Raised before any sink is opened; fatal for the whole invocation.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    // --- Sinks ---

    /// The artifact path could not be created or opened.
    #[error("cannot create {path}")]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to or flushing an open artifact failed mid-emission.
    #[error("failed writing {path}")]
    SinkWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Naming ---

    /// A derived-name template failed to render (unknown variable or helper).
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    // --- Configuration ---

    /// The configuration file (`tegel.config.json`) was not found.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TegelError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Alias for `Result<T, TegelError>`.
pub type Result<T> = std::result::Result<T, TegelError>;
