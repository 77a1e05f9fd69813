//! Theme accessor inlining rule (arrow-function unwrap).
//!
//! Inside styled tagged templates, interpolated arrows that only reach
//! into `theme` are replaced with a direct expression on the
//! module-level `theme` binding:
//!
//! - `${({ theme }) => theme.color.red}` → `${theme.color.red}`
//! - `${props => props.theme.below.xl}` → `${theme.below.xl}`
//!
//! When anything was inlined, a `{ theme }` import is appended after
//! the last import — once per file, and only when no import already
//! binds `theme`.

use restyle_core::{Diagnostic, Span};
use restyle_js::{render_node, NodeKind, SyntaxTree};

use crate::matchers::{self, ArrowShape};
use crate::pipeline::{FileContext, TransformError};

const INLINE_CSS_MESSAGE: &str = "using `css` inside a styled template literal is no longer \
     supported. Try using a regular className or consider inline styles";

const THEME_NOT_RESOLVABLE_MESSAGE: &str = "a `theme` accessor could not be traced back to the \
     function parameter. Please replace it manually with a direct `theme.x` access";

pub fn apply(
    tree: &mut SyntaxTree,
    context: &FileContext,
) -> Result<Vec<Diagnostic>, TransformError> {
    let mut diagnostics = Vec::new();
    let mut inlined = false;

    for tagged in tree.descendants(tree.root()) {
        if !matches!(tree.kind(tagged), NodeKind::TaggedTemplate) {
            continue;
        }
        if !matchers::tag_mentions_styled(tree, tree.children(tagged)[0]) {
            continue;
        }
        let template = tree.children(tagged)[1];
        for interpolation in matchers::template_interpolations(tree, template) {
            if !matches!(tree.kind(interpolation), NodeKind::ArrowFunction { .. }) {
                continue;
            }
            match matchers::classify_arrow(tree, interpolation) {
                ArrowShape::InlineCss => {
                    diagnostics.push(Diagnostic::new(
                        tree.line_of(interpolation),
                        INLINE_CSS_MESSAGE,
                    ));
                }
                ArrowShape::DestructuredTheme => {
                    let body = *tree
                        .children(interpolation)
                        .last()
                        .unwrap_or(&interpolation);
                    let text = render_node(tree, body);
                    tree.replace_raw(interpolation, text);
                    inlined = true;
                }
                ArrowShape::ParamTheme { path } => {
                    tree.replace_raw(interpolation, matchers::accessor_text(&path));
                    inlined = true;
                }
                ArrowShape::ThemeNotResolvable => {
                    diagnostics.push(Diagnostic::new(
                        tree.line_of(interpolation),
                        THEME_NOT_RESOLVABLE_MESSAGE,
                    ));
                }
                ArrowShape::NoTheme => {}
            }
        }
    }

    if inlined {
        insert_theme_import(tree, context);
    }
    Ok(diagnostics)
}

/// Append `import { theme } from <path>;` after the last import, unless
/// some import already binds `theme`.
fn insert_theme_import(tree: &mut SyntaxTree, context: &FileContext) {
    let imports = matchers::collect_imports(tree);
    if matchers::has_theme_binding(&imports) {
        return;
    }

    let anchor = matchers::last_import(tree);
    let at = anchor
        .map(|a| tree.span_of(a).end)
        .unwrap_or(0);
    let specifier = tree.alloc(
        NodeKind::ImportNamedSpecifier {
            imported: "theme".to_string(),
            local: "theme".to_string(),
        },
        Span::empty(at),
        Vec::new(),
    );
    let import = tree.alloc(
        NodeKind::ImportDeclaration {
            source: super::theme_import_path(context.path),
        },
        Span::empty(at),
        vec![specifier],
    );

    let root = tree.root();
    match anchor {
        Some(anchor) => tree.insert_after(root, anchor, import),
        None => tree.insert_first(root, import),
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
    fn destructured_theme_unwraps_and_imports() {
        let (out, diagnostics) = run(
            "import { styled } from \"linaria/react\";\n\nconst Box = styled.div`\n  color: ${({ theme }) => theme.color.red};\n`;\n",
        );
        assert!(out.contains("color: ${theme.color.red};"));
        assert!(out.contains("import { theme } from \"./Theme\";"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn props_dot_theme_unwraps() {
        let (out, _) = run(
            "import { styled } from \"linaria/react\";\nconst Box = styled.div`\n  ${props => props.theme.below.xl};\n`;\n",
        );
        assert!(out.contains("${theme.below.xl}"));
    }

    #[test]
    fn no_duplicate_theme_import() {
        let src = "import { styled } from \"linaria/react\";\nimport { theme } from \"./Theme\";\nconst Box = styled.div`\n  color: ${({ theme }) => theme.x};\n`;\n";
        let (out, _) = run(src);
        assert_eq!(out.matches("import { theme }").count(), 1);
    }

    #[test]
    fn inline_css_abstains_with_one_diagnostic() {
        let src = "import { styled } from \"linaria/react\";\nconst Box = styled.div`\n  ${({ root }) => root && css`color: red`}\n`;\n";
        let (out, diagnostics) = run(src);
        assert_eq!(out, src);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("css"));
    }

    #[test]
    fn unresolvable_chain_gets_a_diagnostic() {
        let src = "import { styled } from \"linaria/react\";\nconst Box = styled.div`\n  width: ${p => p.theme.space + 1}px;\n`;\n";
        let (out, diagnostics) = run(src);
        assert_eq!(out, src);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 3);
    }
}
