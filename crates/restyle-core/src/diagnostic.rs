//! Diagnostics: located warnings about code a rule could not safely rewrite.
//!
//! A [`Diagnostic`] never aborts anything. Rules produce them for shapes
//! that need human judgment; the pipeline gathers them into a
//! [`Diagnostics`] collector and the caller reports them once, after the
//! full rule sequence for a file has run.
//!
//! The collector is an explicit value threaded through the pipeline and
//! returned, never a shared mutable accumulator captured by closures.

use serde::Serialize;

/// A single located warning for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-indexed source line the warning points at.
    pub line: u32,
    /// Human-readable description of the manual edit needed.
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            line,
            message: message.into(),
        }
    }
}

/// Per-file diagnostic collector.
///
/// Ordering is deterministic: diagnostics are reported sorted by line,
/// with insertion order preserved among equal lines (stable sort).
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Add a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Absorb the diagnostics a rule returned.
    pub fn extend(&mut self, diagnostics: Vec<Diagnostic>) {
        self.entries.extend(diagnostics);
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the collector, returning diagnostics in reporting order.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.entries.sort_by_key(|d| d.line);
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_by_line() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::new(9, "third"));
        diags.push(Diagnostic::new(2, "first"));
        diags.push(Diagnostic::new(5, "second"));

        let sorted = diags.into_sorted();
        assert_eq!(sorted[0].line, 2);
        assert_eq!(sorted[1].line, 5);
        assert_eq!(sorted[2].line, 9);
    }

    #[test]
    fn stable_within_a_line() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::new(3, "a"));
        diags.push(Diagnostic::new(3, "b"));

        let sorted = diags.into_sorted();
        assert_eq!(sorted[0].message, "a");
        assert_eq!(sorted[1].message, "b");
    }

    #[test]
    fn extend_absorbs_rule_output() {
        let mut diags = Diagnostics::new();
        diags.extend(vec![Diagnostic::new(1, "x"), Diagnostic::new(2, "y")]);
        assert_eq!(diags.len(), 2);
        assert!(!diags.is_empty());
    }
}
