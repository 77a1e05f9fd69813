//! Theme module rewrite rule.
//!
//! Retargets the legacy standalone theme-utility import to a named
//! `{ theme }` import from the canonical theme module, then rewrites
//! `theme("a.b.1")` helper calls inside `styled(...)` tagged templates
//! into static accessor chains: string segments become dot access,
//! numeric segments become index access.

use restyle_core::{Diagnostic, Span};
use restyle_js::{NodeKind, SyntaxTree};

use crate::matchers;
use crate::pipeline::{FileContext, TransformError};

const LEGACY_THEME_MODULE: &str = "@jetshop/ui/utils/theme";

pub fn apply(
    tree: &mut SyntaxTree,
    context: &FileContext,
) -> Result<Vec<Diagnostic>, TransformError> {
    let imports = matchers::collect_imports(tree);
    let Some(legacy) = imports.iter().find(|i| i.source == LEGACY_THEME_MODULE) else {
        return Ok(Vec::new());
    };

    // Idempotence guard: something may already bind theme from the
    // canonical module.
    if !matchers::has_theme_binding(&imports) {
        let source = super::theme_import_path(context.path);
        let at = tree.span_of(legacy.node).start;
        let specifier = tree.alloc(
            NodeKind::ImportNamedSpecifier {
                imported: "theme".to_string(),
                local: "theme".to_string(),
            },
            Span::empty(at),
            Vec::new(),
        );
        tree.replace(
            legacy.node,
            NodeKind::ImportDeclaration { source },
            vec![specifier],
        );
    }

    rewrite_theme_calls(tree, context)?;
    Ok(Vec::new())
}

fn rewrite_theme_calls(
    tree: &mut SyntaxTree,
    context: &FileContext,
) -> Result<(), TransformError> {
    let mut rewrites = Vec::new();
    for tagged in tree.descendants(tree.root()) {
        if !matches!(tree.kind(tagged), NodeKind::TaggedTemplate) {
            continue;
        }
        if !matchers::tag_is_styled_call(tree, tree.children(tagged)[0]) {
            continue;
        }
        for node in tree.descendants(tagged) {
            match matchers::theme_call_path(tree, node) {
                Ok(Some(path)) => rewrites.push((node, path)),
                Ok(None) => {}
                Err(()) => {
                    return Err(TransformError::structural(format!(
                        "theme() call without a string-literal accessor argument in {}",
                        context.path.display()
                    )));
                }
            }
        }
    }

    for (node, path) in rewrites {
        let text = bracket_accessor(&path);
        tree.replace_raw(node, text);
    }
    Ok(())
}

/// `"colors.1"` → `theme.colors[1]`; `"fontFamilies.heavy"` →
/// `theme.fontFamilies.heavy`. Empty segments are string keys.
fn bracket_accessor(path: &str) -> String {
    let mut out = String::from("theme");
    for segment in path.split('.') {
        if matchers::is_numeric_segment(segment) {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            out.push('.');
            out.push_str(segment);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use restyle_js::{parse, serialize};
    use std::path::Path;

    fn run(path: &str, src: &str) -> String {
        let mut tree = parse(src).unwrap();
        let context = FileContext {
            path: Path::new(path),
        };
        apply(&mut tree, &context).unwrap();
        serialize(&tree)
    }

    #[test]
    fn accessor_conversion() {
        assert_eq!(bracket_accessor("colors.1"), "theme.colors[1]");
        assert_eq!(bracket_accessor("fontFamilies.heavy"), "theme.fontFamilies.heavy");
        assert_eq!(bracket_accessor("a.2.b"), "theme.a[2].b");
    }

    #[test]
    fn rewrites_import_and_calls() {
        let out = run(
            "src/components/Button.js",
            "import theme from \"@jetshop/ui/utils/theme\";\n\nconst B = styled(\"button\")`\n  color: ${theme(\"colors.1\")};\n`;\n",
        );
        assert!(out.contains("import { theme } from \"./Theme\";"));
        assert!(out.contains("${theme.colors[1]}"));
    }

    #[test]
    fn relative_path_from_nested_directory() {
        let out = run(
            "src/components/Cart/Cart.js",
            "import theme from \"@jetshop/ui/utils/theme\";\n",
        );
        assert!(out.contains("import { theme } from \"../Theme\";"));
    }

    #[test]
    fn absent_import_is_a_no_op() {
        let src = "const B = styled(\"button\")`\n  color: ${theme(\"colors.1\")};\n`;\n";
        assert_eq!(run("src/components/B.js", src), src);
    }

    #[test]
    fn calls_outside_styled_calls_untouched() {
        let src = "import theme from \"@jetshop/ui/utils/theme\";\n\nconst c = theme(\"colors.1\");\n";
        let out = run("src/components/B.js", src);
        assert!(out.contains("theme(\"colors.1\")"));
    }

    #[test]
    fn non_literal_argument_is_fatal() {
        let mut tree = parse(
            "import theme from \"@jetshop/ui/utils/theme\";\nconst B = styled(\"b\")`${theme(key)}`;\n",
        )
        .unwrap();
        let context = FileContext {
            path: Path::new("src/components/B.js"),
        };
        assert!(apply(&mut tree, &context).is_err());
    }
}
