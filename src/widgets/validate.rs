//! Answer validation shared by prompts that accept a validator.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Outcome of a validator. An invalid result without a message falls back to the prompt's
/// generic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(Option<String>),
}

impl Validation {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(Some(message.into()))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    /// Error text to show, `None` when valid.
    pub fn error_message(&self, fallback: &str) -> Option<String> {
        match self {
            Validation::Valid => None,
            Validation::Invalid(Some(message)) if !message.is_empty() => Some(message.clone()),
            Validation::Invalid(_) => Some(fallback.to_string()),
        }
    }
}

impl From<bool> for Validation {
    fn from(valid: bool) -> Self {
        if valid {
            Validation::Valid
        } else {
            Validation::Invalid(None)
        }
    }
}

impl<E: Into<String>> From<Result<(), E>> for Validation {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Validation::Valid,
            Err(message) => Validation::Invalid(Some(message.into())),
        }
    }
}

/// Runs on a worker thread while the prompt shows its busy indicator.
pub type Validator<T> = Arc<dyn Fn(&T) -> Validation + Send + Sync>;

pub fn validator<T, F, R>(check: F) -> Validator<T>
where
    F: Fn(&T) -> R + Send + Sync + 'static,
    R: Into<Validation>,
{
    Arc::new(move |value| check(value).into())
}

/// Run `validate` on `value`. A validator that panics rejects the value with the prompt's
/// generic message instead of ending the prompt.
pub(crate) fn run_validator<T>(validate: &Validator<T>, value: &T) -> Validation {
    panic::catch_unwind(AssertUnwindSafe(|| validate(value))).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|reason| reason.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        tracing::warn!(reason = %reason, "validator panicked");
        Validation::Invalid(None)
    })
}
