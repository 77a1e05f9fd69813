//! Deprecated-API warning rule: `.withComponent` has no linaria
//! equivalent. One diagnostic per occurrence, never rewritten.

use restyle_core::Diagnostic;
use restyle_js::{NodeKind, SyntaxTree};

use crate::pipeline::{FileContext, TransformError};

const WITH_COMPONENT_MESSAGE: &str =
    "`.withComponent` is no longer supported; create a separate styled component instead";

pub fn apply(
    tree: &mut SyntaxTree,
    _context: &FileContext,
) -> Result<Vec<Diagnostic>, TransformError> {
    let mut diagnostics = Vec::new();
    for id in tree.descendants(tree.root()) {
        let is_with_component = matches!(
            tree.kind(id),
            NodeKind::MemberExpression { property: Some(p), .. } if p == "withComponent"
        );
        if is_with_component {
            diagnostics.push(Diagnostic::new(tree.line_of(id), WITH_COMPONENT_MESSAGE));
        }
    }
    Ok(diagnostics)
}
