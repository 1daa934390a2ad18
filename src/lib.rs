//! Inline interactive prompts for terminal programs.
//!
//! Invariant: single output gate. Only `core::output::OutputGate::flush(..)` writes to the
//! terminal, and only one prompt may own the terminal at a time.
//!
//! # Public API Overview
//! - Describe choices with [`Item`] ([`Choice`] or [`Separator`]).
//! - Build a prompt ([`SelectPrompt`], [`CheckboxPrompt`], [`LazySelectPrompt`],
//!   [`PathInputPrompt`], [`TextInputPrompt`], [`ConfirmPrompt`]) and hand it to
//!   [`PromptRuntime::run`].
//! - An [`Answer`] is either `Submitted(value)` or `Cancelled`; `ctrl+c` surfaces as
//!   [`PromptError::Aborted`].

#![allow(clippy::type_complexity, clippy::too_many_arguments)]

pub mod config;
pub mod logging;

pub mod core;
pub mod platform;
pub mod render;
pub mod runtime;
pub mod widgets;

/// Choice list model.
pub use crate::core::item::{Choice, Disabled, Item, KeyedChoice, Separator};

/// Failures surfaced by prompts.
pub use crate::core::error::{ConfigurationError, PromptError};

/// Keybinding configuration and default mappings.
pub use crate::core::keybindings::{
    KeyBinding, KeyId, PromptAction, PromptKeybindingsConfig, PromptKeybindingsManager,
};

/// Keyboard input parsing and matching helpers.
pub use crate::core::input::{matches_key, parse_key};
pub use crate::core::input_event::{parse_input_events, InputEvent};

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::Terminal;
pub use crate::platform::process_terminal::ProcessTerminal;
pub use crate::platform::stdin_buffer::{StdinBuffer, StdinEvent};

/// Prompt contract and runtime.
pub use crate::runtime::{
    Answer, Deferred, Prompt, PromptRuntime, RenderContext, Resolver, Status, Transition,
};

/// Page window computation.
pub use crate::render::{paginate, PageWindow};

/// Built-in prompts.
pub use crate::widgets::{
    validator, CheckboxConfig, CheckboxPrompt, ConfirmPrompt, Instructions, LazySelectConfig,
    LazySelectPrompt, LoadResult, PathInputConfig, PathInputPrompt, PendingSource, Picked,
    PromptTheme, SelectConfig, SelectPrompt, TextInputConfig, TextInputPrompt, Validation,
    Validator,
};

/// Environment configuration and log setup.
pub use crate::config::EnvConfig;
pub use crate::logging::init_file_logging;

/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
/// ANSI-aware truncation helper.
pub use crate::core::text::utils::truncate_to_width;
