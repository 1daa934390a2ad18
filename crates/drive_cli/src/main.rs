use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use drive_cli::backend::drive_from_config;
use drive_cli::{ActionError, App, CliConfig};
use item_cache::ItemCache;
use prompt_tui::{
    init_file_logging, EnvConfig, ProcessTerminal, PromptError, PromptRuntime, PromptTheme,
};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("drive: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let env = EnvConfig::from_env();
    init_file_logging(&env).context("opening the log file")?;
    let config = CliConfig::from_env().map_err(anyhow::Error::msg)?;
    tracing::info!(backend = %config.backend, "drive starting");

    let drive = drive_from_config(&config).map_err(anyhow::Error::msg)?;
    let cache = match &config.cache_path {
        Some(path) => ItemCache::open_or_default(path)
            .with_context(|| format!("loading the listing cache from {}", path.display()))?,
        None => ItemCache::new(),
    };
    let cache = Arc::new(cache);

    let runtime = PromptRuntime::new(ProcessTerminal::from_config(&env));
    let theme = PromptTheme::for_color(env.no_color);
    let mut app = App::new(runtime, drive, Arc::clone(&cache), theme);
    let outcome = app.run();

    if let Some(path) = &config.cache_path {
        cache
            .save(path)
            .with_context(|| format!("saving the listing cache to {}", path.display()))?;
    }

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(ActionError::Prompt(PromptError::Aborted)) => {
            tracing::info!("aborted by user");
            Ok(ExitCode::from(130))
        }
        Err(err) => Err(err.into()),
    }
}
