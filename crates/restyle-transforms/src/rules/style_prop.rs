//! Style-prop rewrite rule: `css` JSX attributes become `style`.
//!
//! - `css={css`color: red;`}` → `style={{ color: "red" }}`
//! - `css={cond && styles}` → `style={cond ? styles : null}`
//! - any other value shape keeps its value and just renames the
//!   attribute
//!
//! Interpolated template expressions and nested selectors cannot be
//! converted to an object literal; those attributes stay untouched and
//! get a diagnostic.

use restyle_core::Diagnostic;
use restyle_js::{render_node, NodeId, NodeKind, SyntaxTree};

use crate::matchers;
use crate::pipeline::{FileContext, TransformError};
use crate::style_object::{flatten_declarations, StyleObjectError};

const INTERPOLATION_MESSAGE: &str = "cannot convert an interpolated expression inside a `css` \
     prop template literal; edit this style manually";

const NESTED_SELECTOR_MESSAGE: &str = "CSS selectors cannot be polyfilled in a `style` object; \
     move these styles to a `css` helper and assign via className";

pub fn apply(
    tree: &mut SyntaxTree,
    _context: &FileContext,
) -> Result<Vec<Diagnostic>, TransformError> {
    let mut diagnostics = Vec::new();
    let attributes: Vec<NodeId> = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|&id| matches!(tree.kind(id), NodeKind::JsxAttribute { name } if name == "css"))
        .collect();

    for attribute in attributes {
        rewrite_attribute(tree, attribute, &mut diagnostics);
    }
    Ok(diagnostics)
}

fn rewrite_attribute(tree: &mut SyntaxTree, attribute: NodeId, diagnostics: &mut Vec<Diagnostic>) {
    let Some(&value) = tree.children(attribute).first() else {
        // Bare `css` attribute.
        tree.replace_raw(attribute, "style");
        return;
    };

    if !matches!(tree.kind(value), NodeKind::JsxExpressionContainer) {
        rename_only(tree, attribute);
        return;
    }
    let Some(&expression) = tree.children(value).first() else {
        rename_only(tree, attribute);
        return;
    };

    if matchers::is_css_tagged_template(tree, expression) {
        let template = tree.children(expression)[1];
        let interpolations = matchers::template_interpolations(tree, template);
        if !interpolations.is_empty() {
            for interpolation in interpolations {
                diagnostics.push(Diagnostic::new(
                    tree.line_of(interpolation),
                    INTERPOLATION_MESSAGE,
                ));
            }
            return;
        }
        let raw = matchers::template_raw_text(tree, template);
        match flatten_declarations(&raw) {
            Ok(object) => tree.replace_raw(attribute, format!("style={{{}}}", object)),
            Err(StyleObjectError::NestedSelector) => {
                diagnostics.push(Diagnostic::new(
                    tree.line_of(attribute),
                    NESTED_SELECTOR_MESSAGE,
                ));
            }
        }
        return;
    }

    let is_logical_and = matches!(
        tree.kind(expression),
        NodeKind::LogicalExpression { operator } if operator == "&&"
    );
    if is_logical_and {
        let (left_id, right_id) = {
            let children = tree.children(expression);
            (children[0], children[1])
        };
        let left = render_node(tree, left_id);
        let right = render_node(tree, right_id);
        tree.replace_raw(attribute, format!("style={{{} ? {} : null}}", left, right));
        return;
    }

    rename_only(tree, attribute);
}

/// Keep the value text, rename the attribute.
fn rename_only(tree: &mut SyntaxTree, attribute: NodeId) {
    let text = tree.text_of(attribute).to_string();
    if let Some(rest) = text.strip_prefix("css") {
        let renamed = format!("style{}", rest);
        tree.replace_raw(attribute, renamed);
    }
}
