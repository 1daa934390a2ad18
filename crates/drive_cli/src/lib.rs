//! Interactive file manager for a remote drive.
//!
//! ## Backend selection
//!
//! `DRIVE_CLI_BACKEND` picks the drive implementation. Only `mock` exists (and is the default):
//! a seeded in-memory drive whose transfers read and write real local files.
//! `DRIVE_CLI_MOCK_LATENCY_MS` adds a delay to every mock call, which makes the busy indicator
//! and batch concurrency visible.
//!
//! ## Listing cache
//!
//! Folder listings and the cursor position last used in each folder are kept in memory. With
//! `DRIVE_CLI_CACHE_PATH` set, they are loaded from that JSON snapshot on start and written
//! back on exit.
//!
//! Terminal, logging, and color settings come from `prompt_tui::EnvConfig` (`PROMPT_TUI_*`).

pub mod app;
pub mod backend;
pub mod batch;
pub mod config;
pub mod error;
pub mod naming;
mod operations;
pub mod questions;
pub mod transfer;

pub use app::{App, Screen};
pub use config::CliConfig;
pub use error::ActionError;
