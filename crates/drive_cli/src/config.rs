use std::path::PathBuf;
use std::time::Duration;

use drive_service_mock::MOCK_BACKEND_ID;
use prompt_tui::config::env_string_opt;

pub const BACKEND_ENV_VAR: &str = "DRIVE_CLI_BACKEND";
pub const CACHE_PATH_ENV_VAR: &str = "DRIVE_CLI_CACHE_PATH";
pub const MOCK_LATENCY_ENV_VAR: &str = "DRIVE_CLI_MOCK_LATENCY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub backend: String,
    /// JSON snapshot of the listing cache.
    pub cache_path: Option<PathBuf>,
    pub mock_latency: Duration,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            backend: MOCK_BACKEND_ID.to_string(),
            cache_path: None,
            mock_latency: Duration::ZERO,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Result<Self, String> {
        let mock_latency = match env_string_opt(MOCK_LATENCY_ENV_VAR) {
            Some(raw) => {
                let millis = raw.trim().parse::<u64>().map_err(|_| {
                    format!(
                        "{MOCK_LATENCY_ENV_VAR} must be a whole number of milliseconds, got '{raw}'"
                    )
                })?;
                Duration::from_millis(millis)
            }
            None => Duration::ZERO,
        };
        Ok(Self {
            backend: env_string_opt(BACKEND_ENV_VAR)
                .map(|value| value.trim().to_string())
                .unwrap_or_else(|| MOCK_BACKEND_ID.to_string()),
            cache_path: env_string_opt(CACHE_PATH_ENV_VAR).map(PathBuf::from),
            mock_latency,
        })
    }
}
