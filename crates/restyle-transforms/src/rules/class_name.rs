//! className rewrite rule.
//!
//! `className={css`...`}` gets the same flat-declaration-to-object
//! treatment as the `css` prop, and on success the attribute is
//! renamed to `style`. Unlike the `css` prop rule, values that do not
//! involve the `css` helper or a logical-AND pattern are left alone —
//! className is a legitimate attribute in its own right.

use restyle_core::Diagnostic;
use restyle_js::{render_node, NodeId, NodeKind, SyntaxTree};

use crate::matchers;
use crate::pipeline::{FileContext, TransformError};
use crate::style_object::{flatten_declarations, StyleObjectError};

const INTERPOLATION_MESSAGE: &str = "cannot polyfill an interpolated expression inside a \
     `className` template literal; edit this style manually";

const NESTED_SELECTOR_MESSAGE: &str = "CSS selectors cannot be polyfilled in a `style` object; \
     extract these styles into a variable assigned with the `css` helper";

pub fn apply(
    tree: &mut SyntaxTree,
    _context: &FileContext,
) -> Result<Vec<Diagnostic>, TransformError> {
    let mut diagnostics = Vec::new();
    let attributes: Vec<NodeId> = tree
        .descendants(tree.root())
        .into_iter()
        .filter(|&id| {
            matches!(tree.kind(id), NodeKind::JsxAttribute { name } if name == "className")
        })
        .collect();

    for attribute in attributes {
        rewrite_attribute(tree, attribute, &mut diagnostics);
    }
    Ok(diagnostics)
}

fn rewrite_attribute(tree: &mut SyntaxTree, attribute: NodeId, diagnostics: &mut Vec<Diagnostic>) {
    let Some(&value) = tree.children(attribute).first() else {
        return;
    };
    if !matches!(tree.kind(value), NodeKind::JsxExpressionContainer) {
        return;
    }
    let Some(&expression) = tree.children(value).first() else {
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restyle_js::{parse, serialize};
    use std::path::Path;

    fn run(src: &str) -> (String, Vec<Diagnostic>) {
        let mut tree = parse(src).unwrap();
        let context = FileContext {
            path: Path::new("src/components/X.js"),
        };
        let diagnostics = apply(&mut tree, &context).unwrap();
        (serialize(&tree), diagnostics)
    }

    #[test]
    fn flattens_and_renames() {
        let (out, diagnostics) =
            run("const el = <div className={css`color: red;`}>x</div>;\n");
        assert!(out.contains("style={{ color: \"red\" }}"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn interpolations_abstain_per_expression_at_their_line() {
        let src = "const el = (\n  <div\n    className={css`\n      color: ${main};\n      width: ${wide};\n    `}\n  />\n);\n";
        let (out, diagnostics) = run(src);
        assert_eq!(out, src);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].line, 4);
        assert_eq!(diagnostics[1].line, 5);
    }

    #[test]
    fn nested_selector_recommends_extraction() {
        let src = "const el = <div className={css`a { color: red; }`} />;\n";
        let (out, diagnostics) = run(src);
        assert_eq!(out, src);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("extract"));
    }

    #[test]
    fn plain_string_class_name_untouched() {
        let src = "const el = <div className=\"header\" />;\n";
        let (out, diagnostics) = run(src);
        assert_eq!(out, src);
        assert!(diagnostics.is_empty());
    }
}
