//! Rendering primitives: page windows and the inline frame renderer.

pub mod pagination;
pub mod renderer;

pub use pagination::{paginate, PageWindow};
pub use renderer::InlineRenderer;
