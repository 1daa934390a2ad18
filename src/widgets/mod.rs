//! Prompt variants and the pieces they share.

pub mod checkbox;
pub mod confirm;
pub mod lazy_select;
pub mod line_input;
pub mod list;
pub mod loader;
pub mod path_input;
pub mod select;
pub mod text_input;
pub mod theme;
pub mod validate;

pub use checkbox::{CheckboxConfig, CheckboxPrompt, Instructions};
pub use confirm::ConfirmPrompt;
pub use lazy_select::{LazySelectConfig, LazySelectPrompt, LoadResult, PendingSource, Picked};
pub use line_input::LineInput;
pub use path_input::{complete_path, Candidate, PathInputConfig, PathInputPrompt};
pub use select::{SelectConfig, SelectPrompt};
pub use text_input::{TextInputConfig, TextInputPrompt};
pub use theme::PromptTheme;
pub use validate::{validator, Validation, Validator};
