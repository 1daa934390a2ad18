use std::io;
use std::path::{Path, PathBuf};

use drive_service::DriveError;
use prompt_tui::{ConfigurationError, PromptError};
use thiserror::Error;

/// Why a screen action did not complete.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Drive(#[from] DriveError),

    #[error("I/O error while {operation} at {path}: {source}")]
    Local {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{failed} of {total} items failed: {first}")]
    Batch {
        failed: usize,
        total: usize,
        first: Box<ActionError>,
    },
}

impl From<ConfigurationError> for ActionError {
    fn from(err: ConfigurationError) -> Self {
        Self::Prompt(PromptError::Configuration(err))
    }
}

impl ActionError {
    pub fn local(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Local {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Errors that end the program instead of returning to the previous screen.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ActionError::Prompt(
                PromptError::Aborted | PromptError::AlreadyActive | PromptError::Terminal(_)
            )
        )
    }
}
