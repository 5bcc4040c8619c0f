//! Rendering module
//!
//! The render capability the engine depends on, the in-memory board that
//! implements it, and the countdown text helpers.

pub mod board;
pub mod format;
pub mod target;

// Re-export main types
pub use board::{BoardRenderer, BoardSnapshot, CardView};
pub use format::{digit_fragments, format_hms, fragments_to_html, Fragment};
pub use target::RenderTarget;
