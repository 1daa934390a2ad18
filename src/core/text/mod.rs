//! Text helpers (ANSI parsing, width calculations, truncation).
//!
//! These helpers are pure (string in/string out) so prompts and the renderer can share them.

pub mod ansi;
pub mod utils;
pub mod width;
