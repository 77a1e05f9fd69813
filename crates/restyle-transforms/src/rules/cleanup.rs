//! Dead-code cleanup rule.
//!
//! `const styles = (...) => css`...`` was a workaround pattern under
//! emotion; with linaria the wrapper is redundant. Where a declarator's
//! initializer is an arrow whose body is exactly a `css`-tagged
//! template, the arrow is dropped and the template assigned directly.
//! The wrapper stays when any parameter is referenced inside the
//! template, since dropping it would orphan those references.

use restyle_core::Diagnostic;
use restyle_js::{render_node, NodeId, NodeKind, SyntaxTree};

use crate::matchers;
use crate::pipeline::{FileContext, TransformError};

pub fn apply(
    tree: &mut SyntaxTree,
    _context: &FileContext,
) -> Result<Vec<Diagnostic>, TransformError> {
    let mut unwraps = Vec::new();

    for declarator in tree.descendants(tree.root()) {
        if !matches!(tree.kind(declarator), NodeKind::VariableDeclarator { .. }) {
            continue;
        }
        let Some(&init) = tree.children(declarator).first() else {
            continue;
        };
        if !matches!(tree.kind(init), NodeKind::ArrowFunction { .. }) {
            continue;
        }
        let Some(&body) = tree.children(init).last() else {
            continue;
        };
        if !matchers::is_css_tagged_template(tree, body) {
            continue;
        }
        if template_references_params(tree, init, body) {
            continue;
        }
        unwraps.push((init, body));
    }

    for (arrow, body) in unwraps {
        let text = render_node(tree, body);
        tree.replace_raw(arrow, text);
    }
    Ok(Vec::new())
}

/// True when any of the arrow's parameter bindings is referenced inside
/// the template body.
fn template_references_params(tree: &SyntaxTree, arrow: NodeId, body: NodeId) -> bool {
    let params = param_locals(tree, arrow);
    if params.is_empty() {
        return false;
    }
    tree.descendants(body).into_iter().any(|id| {
        matches!(tree.kind(id), NodeKind::Identifier { name } if params.iter().any(|p| p == name))
    })
}

fn param_locals(tree: &SyntaxTree, arrow: NodeId) -> Vec<String> {
    let NodeKind::ArrowFunction { param_count } = *tree.kind(arrow) else {
        return Vec::new();
    };
    let mut locals = Vec::new();
    for &param in &tree.children(arrow)[..param_count] {
        match tree.kind(param) {
            NodeKind::Identifier { name } => locals.push(name.clone()),
            NodeKind::RestElement { local } => locals.push(local.clone()),
            NodeKind::ObjectPattern => {
                for &property in tree.children(param) {
                    match tree.kind(property) {
                        NodeKind::PatternProperty { local, .. } => locals.push(local.clone()),
                        NodeKind::RestElement { local } => locals.push(local.clone()),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    locals
}
