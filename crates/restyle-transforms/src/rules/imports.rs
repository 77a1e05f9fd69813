//! Import rewrite rule: retarget emotion module imports to linaria.
//!
//! - lone default `styled` → `import { styled } from "linaria/react"`
//! - lone named imports (`css`) → same names from `"linaria"`
//! - combined default+named → split into the two imports above, the
//!   named part inserted immediately after the original
//!
//! Unknown module names are left untouched. This rule never emits
//! diagnostics.

use restyle_core::{Diagnostic, Span};
use restyle_js::{NodeKind, SyntaxTree};

use crate::matchers::{self, Imported};
use crate::pipeline::{FileContext, TransformError};

const LEGACY_MODULES: &[&str] = &["react-emotion", "emotion", "preact-emotion", "@emotion/core"];
const LINARIA_REACT: &str = "linaria/react";
const LINARIA_CORE: &str = "linaria";

pub fn apply(
    tree: &mut SyntaxTree,
    _context: &FileContext,
) -> Result<Vec<Diagnostic>, TransformError> {
    for import in matchers::collect_imports(tree) {
        if !LEGACY_MODULES.contains(&import.source.as_str()) {
            continue;
        }
        rewrite_legacy_import(tree, &import);
    }
    Ok(Vec::new())
}

fn rewrite_legacy_import(tree: &mut SyntaxTree, import: &matchers::ImportView) {
    let has_default = import
        .bindings
        .iter()
        .any(|b| b.imported == Imported::Default);
    let named: Vec<&matchers::ImportBinding> = import
        .bindings
        .iter()
        .filter(|b| matches!(b.imported, Imported::Named(_)))
        .collect();

    if has_default && !named.is_empty() {
        split_combined_import(tree, import, &named);
    } else if has_default {
        let default_is_styled = import
            .bindings
            .iter()
            .any(|b| b.imported == Imported::Default && b.local == "styled");
        if default_is_styled {
            replace_with_named_styled(tree, import.node);
        } else {
            // Unrecognized default binding: move the module, keep the shape.
            retarget(tree, import.node, LINARIA_CORE);
        }
    } else {
        // Named-only (css and friends), namespace, or side-effect import.
        retarget(tree, import.node, LINARIA_CORE);
    }
}

/// `import styled, { css } from "react-emotion"` becomes two sibling
/// declarations: the styled import from linaria/react, then the named
/// import from linaria.
fn split_combined_import(
    tree: &mut SyntaxTree,
    import: &matchers::ImportView,
    named: &[&matchers::ImportBinding],
) {
    let at = tree.span_of(import.node).end;
    let mut specifiers = Vec::new();
    for binding in named {
        let Imported::Named(imported) = &binding.imported else {
            continue;
        };
        specifiers.push(tree.alloc(
            NodeKind::ImportNamedSpecifier {
                imported: imported.clone(),
                local: binding.local.clone(),
            },
            Span::empty(at),
            Vec::new(),
        ));
    }
    let named_import = tree.alloc(
        NodeKind::ImportDeclaration {
            source: LINARIA_CORE.to_string(),
        },
        Span::empty(at),
        specifiers,
    );

    replace_with_named_styled(tree, import.node);
    let root = tree.root();
    tree.insert_after(root, import.node, named_import);
}

fn replace_with_named_styled(tree: &mut SyntaxTree, import: restyle_js::NodeId) {
    let at = tree.span_of(import).start;
    let styled = tree.alloc(
        NodeKind::ImportNamedSpecifier {
            imported: "styled".to_string(),
            local: "styled".to_string(),
        },
        Span::empty(at),
        Vec::new(),
    );
    tree.replace(
        import,
        NodeKind::ImportDeclaration {
            source: LINARIA_REACT.to_string(),
        },
        vec![styled],
    );
}

fn retarget(tree: &mut SyntaxTree, import: restyle_js::NodeId, source: &str) {
    let specifiers = tree.children(import).to_vec();
    tree.replace(
        import,
        NodeKind::ImportDeclaration {
            source: source.to_string(),
        },
        specifiers,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use restyle_js::{parse, serialize};
    use std::path::Path;

    fn run(src: &str) -> String {
        let mut tree = parse(src).unwrap();
        let context = FileContext {
            path: Path::new("src/components/X.js"),
        };
        apply(&mut tree, &context).unwrap();
        serialize(&tree)
    }

    #[test]
    fn lone_default_styled() {
        assert_eq!(
            run("import styled from \"react-emotion\";\n"),
            "import { styled } from \"linaria/react\";\n"
        );
    }

    #[test]
    fn lone_named_css() {
        assert_eq!(
            run("import { css } from \"react-emotion\";\n"),
            "import { css } from \"linaria\";\n"
        );
    }

    #[test]
    fn emotion_core_css() {
        assert_eq!(
            run("import { css } from \"@emotion/core\";\n"),
            "import { css } from \"linaria\";\n"
        );
    }

    #[test]
    fn combined_import_splits_in_order() {
        assert_eq!(
            run("import styled, { css } from \"react-emotion\";\nrest();\n"),
            "import { styled } from \"linaria/react\";\nimport { css } from \"linaria\";\nrest();\n"
        );
    }

    #[test]
    fn unknown_module_untouched() {
        let src = "import styled from \"styled-components\";\n";
        assert_eq!(run(src), src);
    }
}
