use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("item '{id}' was not found")]
    NotFound { id: String },

    #[error("item '{id}' is not a folder")]
    NotAFolder { id: String },

    #[error("item '{id}' is a folder")]
    IsAFolder { id: String },

    #[error("an item named '{name}' already exists in '{parent}'")]
    NameConflict { name: String, parent: String },

    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Backend(String),
}

impl DriveError {
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
