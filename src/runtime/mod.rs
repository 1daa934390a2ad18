//! Prompt runtime and the prompt contract.

pub mod deferred;
pub mod prompt;
pub mod prompt_runtime;

pub use deferred::{Deferred, Resolver};
pub use prompt::{Answer, Prompt, RenderContext, Status, Transition};
pub use prompt_runtime::PromptRuntime;
