use thiserror::Error;

/// Invalid prompt configuration, detected before anything is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("[{prompt} prompt] No selectable choices. All choices are disabled.")]
    NoSelectableChoices { prompt: &'static str },

    #[error("[{prompt} prompt] page size must be at least 1")]
    ZeroPageSize { prompt: &'static str },
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The deferred item source of a lazy prompt failed.
    #[error("failed to load choices: {0}")]
    Load(String),

    /// ctrl+c while a prompt was active.
    #[error("prompt aborted by user")]
    Aborted,

    #[error("another prompt is already active")]
    AlreadyActive,

    /// A deferred task was dropped before producing a value.
    #[error("background task ended without a result")]
    Disconnected,

    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
}

impl PromptError {
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load(message.into())
    }
}
