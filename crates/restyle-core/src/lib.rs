//! Shared infrastructure for the restyle codemod engine.
//!
//! This crate holds the pieces every other crate leans on: byte spans,
//! offset/position conversions, the diagnostic model, and the unified
//! error type surfaced at the CLI boundary.

pub mod diagnostic;
pub mod error;
pub mod span;
pub mod text;

pub use diagnostic::{Diagnostic, Diagnostics};
pub use error::RestyleError;
pub use span::Span;
