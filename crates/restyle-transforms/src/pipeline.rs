//! Per-file pipeline: parse, run the rewrite rules in fixed order,
//! serialize, hand back text plus diagnostics.
//!
//! The rule order matters: later rules depend on earlier rules having
//! normalized the tree. Accessor inlining, for example, checks for an
//! existing `theme` import binding, which the theme-module rule may
//! have just established. The order is total and never varies.
//!
//! One tree and one diagnostic collector live per file and are dropped
//! when the file is done; there is no cross-file state.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use restyle_core::{Diagnostic, Diagnostics};
use restyle_js::{parse, serialize, ParseError, SyntaxTree};

use crate::rules;

/// One input file: where it lives and what it contains.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        SourceFile {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Result of transforming one file.
#[derive(Debug, Serialize)]
pub struct TransformOutput {
    /// Rewritten source text. Byte-identical to the input when nothing
    /// matched.
    pub source: String,
    /// All diagnostics for the file, sorted by line.
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformOutput {
    /// True when the transform changed the file's text.
    pub fn changed(&self, original: &str) -> bool {
        self.source != original
    }
}

/// Fatal, per-file transform failure. Recoverable mismatches never
/// land here; they become diagnostics.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A rule hit a structurally impossible state, like a `theme()`
    /// call whose accessor argument is not a string literal.
    #[error("structural failure: {message}")]
    Structural { message: String },
}

impl TransformError {
    pub fn structural(message: impl Into<String>) -> Self {
        TransformError::Structural {
            message: message.into(),
        }
    }
}

/// Read-only per-file context passed to every rule.
pub struct FileContext<'a> {
    pub path: &'a Path,
}

type RuleFn = fn(&mut SyntaxTree, &FileContext) -> Result<Vec<Diagnostic>, TransformError>;

// Fixed total rule order.
const RULES: &[(&str, RuleFn)] = &[
    ("imports", rules::imports::apply),
    ("theme-module", rules::theme_module::apply),
    ("theme-inline", rules::theme_inline::apply),
    ("style-prop", rules::style_prop::apply),
    ("class-name", rules::class_name::apply),
    ("cleanup", rules::cleanup::apply),
    ("deprecated", rules::deprecated::apply),
];

/// Migrate one file from emotion's API to linaria's.
pub fn emotion_to_linaria(file: &SourceFile) -> Result<TransformOutput, TransformError> {
    let mut tree = parse(&file.source)?;
    let context = FileContext { path: &file.path };
    let mut collector = Diagnostics::new();

    for (name, rule) in RULES {
        debug!(rule = name, path = %file.path.display(), "applying rule");
        collector.extend(rule(&mut tree, &context)?);
    }

    let diagnostics = collector.into_sorted();
    debug!(
        path = %file.path.display(),
        diagnostics = diagnostics.len(),
        "pipeline complete"
    );
    Ok(TransformOutput {
        source: serialize(&tree),
        diagnostics,
    })
}
