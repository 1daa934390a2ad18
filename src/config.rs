//! Environment configuration.

use std::env;

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// File receiving `tracing` output. The terminal owns stdout/stderr, so logging is off
    /// unless this is set.
    pub log_path: Option<String>,
    pub log_filter: String,
    /// File receiving a copy of every terminal write.
    pub write_log: Option<String>,
    pub no_color: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            write_log: None,
            no_color: false,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_path: env_string_opt("PROMPT_TUI_LOG"),
            log_filter: env_string_opt("PROMPT_TUI_LOG_FILTER")
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            write_log: env_string_opt("PROMPT_TUI_WRITE_LOG"),
            no_color: env_flag("PROMPT_TUI_NO_COLOR"),
        }
    }
}

pub fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

pub fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
