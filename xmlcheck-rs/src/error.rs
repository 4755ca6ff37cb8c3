//! Error types for xmlcheck.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for xmlcheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while comparing or validating documents.
#[derive(Error, Debug)]
pub enum Error {
    /// The document is not well-formed.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// The document at the given path is not well-formed.
    #[error("XML parse error in {}: {message}", path.display())]
    ParseFile { path: PathBuf, message: String },

    /// The XSD could not be loaded or compiled.
    #[error("Schema error: {0}")]
    Schema(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Report serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attaches a source path to a parse error.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Error::Parse(message) => Error::ParseFile {
                path: path.into(),
                message,
            },
            Error::Xml(e) => Error::ParseFile {
                path: path.into(),
                message: e.to_string(),
            },
            other => other,
        }
    }
}
