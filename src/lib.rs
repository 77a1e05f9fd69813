//! Restyle: source-to-source codemod engine for CSS-in-JS migrations.
//!
//! Rewrites JavaScript/JSX trees in place while preserving every byte of
//! untouched source text, and reports what it could not rewrite safely.

// Core infrastructure - re-exported from restyle-core
pub use restyle_core::diagnostic;
pub use restyle_core::error;
pub use restyle_core::span;
pub use restyle_core::text;

// Transform entry points
pub use restyle_transforms::{
    emotion_to_linaria, Registry, SourceFile, TransformError, TransformFn, TransformOutput,
};

// Directory walking and reporting
pub mod driver;
pub mod report;
