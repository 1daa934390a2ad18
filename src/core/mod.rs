//! Core interfaces and types.

pub mod error;
pub mod input;
pub mod input_event;
pub mod item;
pub mod keybindings;
pub mod output;
pub mod terminal;
pub mod text;
