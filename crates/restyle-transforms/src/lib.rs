//! Rewrite rules and pipeline for migrating CSS-in-JS component source
//! from emotion's API to linaria's.
//!
//! Structure:
//! - [`matchers`] — pure shape predicates and extractors over the tree
//! - [`style_object`] — flat CSS declaration text to JS object literal
//! - [`rules`] — one module per rewrite rule, applied in fixed order
//! - [`pipeline`] — per-file orchestration: parse, rules, serialize
//! - [`registry`] — transform name lookup for the CLI
//!
//! Every rule is conservative: shapes outside its mechanically-safe
//! subset are left untouched, optionally with a diagnostic telling the
//! developer what to edit by hand. A wrong rewrite corrupts working
//! code; an abstention only costs a manual edit.

pub mod apollo;
pub mod matchers;
pub mod pipeline;
pub mod registry;
pub mod rules;
pub mod style_object;

pub use pipeline::{
    emotion_to_linaria, FileContext, SourceFile, TransformError, TransformOutput,
};
pub use registry::{Registry, TransformFn};
