//! Pure shape predicates and extractors over the syntax tree.
//!
//! Matchers never mutate and never emit diagnostics; they answer "does
//! this node match shape S" and pull out the pieces a rule needs. Each
//! rule classifies its candidates through one function returning a
//! tagged value, then dispatches on the tag, which keeps the matching
//! precedence explicit and testable apart from the mutation.

use restyle_js::{NodeId, NodeKind, SyntaxTree};

/// Member-chain walk bound. Deeper chains abstain instead of walking on.
pub const ACCESSOR_WALK_LIMIT: usize = 32;

// ===== Import view =====

/// What a specifier binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Default,
    Named(String),
    Namespace,
}

/// One binding introduced by an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub imported: Imported,
}

/// Derived view over one import declaration, clean or rewritten.
#[derive(Debug, Clone)]
pub struct ImportView {
    pub node: NodeId,
    pub source: String,
    pub bindings: Vec<ImportBinding>,
}

/// Collect views of all top-level import declarations in source order.
pub fn collect_imports(tree: &SyntaxTree) -> Vec<ImportView> {
    let mut views = Vec::new();
    for &stmt in tree.children(tree.root()) {
        let NodeKind::ImportDeclaration { source } = tree.kind(stmt) else {
            continue;
        };
        let mut bindings = Vec::new();
        for &spec in tree.children(stmt) {
            match tree.kind(spec) {
                NodeKind::ImportDefaultSpecifier { local } => bindings.push(ImportBinding {
                    local: local.clone(),
                    imported: Imported::Default,
                }),
                NodeKind::ImportNamedSpecifier { imported, local } => {
                    bindings.push(ImportBinding {
                        local: local.clone(),
                        imported: Imported::Named(imported.clone()),
                    })
                }
                NodeKind::ImportNamespaceSpecifier { local } => bindings.push(ImportBinding {
                    local: local.clone(),
                    imported: Imported::Namespace,
                }),
                _ => {}
            }
        }
        views.push(ImportView {
            node: stmt,
            source: source.clone(),
            bindings,
        });
    }
    views
}

/// The last top-level import declaration, if any.
pub fn last_import(tree: &SyntaxTree) -> Option<NodeId> {
    tree.children(tree.root())
        .iter()
        .copied()
        .filter(|&stmt| matches!(tree.kind(stmt), NodeKind::ImportDeclaration { .. }))
        .last()
}

/// True if any import already binds `theme` as a named `theme` import.
pub fn has_theme_binding(imports: &[ImportView]) -> bool {
    imports.iter().any(|import| {
        import.bindings.iter().any(|binding| {
            binding.local == "theme" && binding.imported == Imported::Named("theme".to_string())
        })
    })
}

// ===== styled / theme shapes =====

fn unwrap_paren(tree: &SyntaxTree, mut id: NodeId) -> NodeId {
    while matches!(tree.kind(id), NodeKind::Paren) {
        id = tree.children(id)[0];
    }
    id
}

/// True if the tagged-template tag mentions `styled` anywhere along its
/// callee/object spine: `styled`, `styled.div`, `styled(Component)`,
/// `styled(Component).attrs(...)` all count.
pub fn tag_mentions_styled(tree: &SyntaxTree, tag: NodeId) -> bool {
    let mut cur = unwrap_paren(tree, tag);
    for _ in 0..ACCESSOR_WALK_LIMIT {
        match tree.kind(cur) {
            NodeKind::Identifier { name } => return name == "styled",
            NodeKind::MemberExpression { .. } | NodeKind::CallExpression => {
                cur = unwrap_paren(tree, tree.children(cur)[0]);
            }
            _ => return false,
        }
    }
    false
}

/// True if the tag is exactly a `styled(...)` call.
pub fn tag_is_styled_call(tree: &SyntaxTree, tag: NodeId) -> bool {
    let tag = unwrap_paren(tree, tag);
    if !matches!(tree.kind(tag), NodeKind::CallExpression) {
        return false;
    }
    let callee = unwrap_paren(tree, tree.children(tag)[0]);
    matches!(tree.kind(callee), NodeKind::Identifier { name } if name == "styled")
}

/// Extract a `theme("a.b.c")` helper call: returns the dot-separated
/// accessor path string. `Ok(None)` when the node is not a `theme(...)`
/// call at all; `Err` when it is one but the single string-literal
/// argument is missing — that is a structurally-impossible state for
/// the rule, not an abstention.
pub fn theme_call_path(tree: &SyntaxTree, id: NodeId) -> Result<Option<String>, ()> {
    if !matches!(tree.kind(id), NodeKind::CallExpression) {
        return Ok(None);
    }
    let children = tree.children(id);
    let callee = unwrap_paren(tree, children[0]);
    if !matches!(tree.kind(callee), NodeKind::Identifier { name } if name == "theme") {
        return Ok(None);
    }
    let [_, arg] = children else {
        return Err(());
    };
    match tree.kind(*arg) {
        NodeKind::Literal { raw } if raw.starts_with('"') || raw.starts_with('\'') => {
            Ok(Some(raw[1..raw.len() - 1].to_string()))
        }
        _ => Err(()),
    }
}

/// True for a non-empty, all-ASCII-digits accessor segment. Empty
/// segments and anything with a letter are string keys.
pub fn is_numeric_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

// ===== Arrow classification =====

/// One step of a theme accessor path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSeg {
    /// `.name` access.
    Key(String),
    /// `[raw]` access, raw index/key text as written.
    Index(String),
}

/// Classification of an arrow function interpolated into a styled
/// template. Variants are ordered by matching precedence; the first
/// matching shape wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrowShape {
    /// The body references an identifier named `css`. Never rewritten.
    InlineCss,
    /// First parameter destructures `theme` as its first property; the
    /// body already refers to `theme` directly.
    DestructuredTheme,
    /// Plain identifier parameter whose body is exactly a member chain
    /// through `.theme` on that parameter; `path` holds the segments
    /// after `theme`, ready to re-root.
    ParamTheme { path: Vec<PathSeg> },
    /// The body mentions a `.theme` member access but the chain does
    /// not bottom out at the parameter. Abstain with a diagnostic.
    ThemeNotResolvable,
    /// The parameter never reaches theme. Silent abstention.
    NoTheme,
}

/// Classify an arrow function for the accessor-inlining rule.
pub fn classify_arrow(tree: &SyntaxTree, arrow: NodeId) -> ArrowShape {
    let NodeKind::ArrowFunction { param_count } = *tree.kind(arrow) else {
        return ArrowShape::NoTheme;
    };
    let children = tree.children(arrow);
    let Some(&body) = children.last() else {
        return ArrowShape::NoTheme;
    };

    if subtree_references_css(tree, body) {
        return ArrowShape::InlineCss;
    }
    if param_count == 0 {
        return ArrowShape::NoTheme;
    }

    let first_param = children[0];
    match tree.kind(first_param) {
        NodeKind::ObjectPattern => {
            // A block body cannot be spliced in as an expression.
            if matches!(tree.kind(body), NodeKind::Block) {
                return ArrowShape::NoTheme;
            }
            let first_property = tree.children(first_param).first().copied();
            let destructures_theme = first_property.is_some_and(|prop| {
                matches!(tree.kind(prop), NodeKind::PatternProperty { local, .. } if local == "theme")
            });
            if destructures_theme {
                ArrowShape::DestructuredTheme
            } else {
                ArrowShape::NoTheme
            }
        }
        NodeKind::Identifier { name } => {
            let param = name.clone();
            let expr = unwrap_paren(tree, body);
            if let Some(path) = param_theme_path(tree, expr, &param) {
                ArrowShape::ParamTheme { path }
            } else if mentions_theme_member(tree, body) {
                ArrowShape::ThemeNotResolvable
            } else {
                ArrowShape::NoTheme
            }
        }
        _ => ArrowShape::NoTheme,
    }
}

fn subtree_references_css(tree: &SyntaxTree, id: NodeId) -> bool {
    tree.descendants(id)
        .into_iter()
        .any(|n| matches!(tree.kind(n), NodeKind::Identifier { name } if name == "css"))
}

fn mentions_theme_member(tree: &SyntaxTree, id: NodeId) -> bool {
    tree.descendants(id).into_iter().any(|n| {
        matches!(
            tree.kind(n),
            NodeKind::MemberExpression { property: Some(p), .. } if p == "theme"
        )
    })
}

/// Walk a member chain outside-in, accumulating segments, until the
/// object is the parameter itself. Succeeds only when the innermost
/// segment is `theme`; the returned path excludes it.
fn param_theme_path(tree: &SyntaxTree, outermost: NodeId, param: &str) -> Option<Vec<PathSeg>> {
    let mut segments = Vec::new();
    let mut cur = outermost;

    for _ in 0..ACCESSOR_WALK_LIMIT {
        match tree.kind(cur) {
            NodeKind::MemberExpression {
                property: Some(name),
                ..
            } => {
                segments.push(PathSeg::Key(name.clone()));
                cur = tree.children(cur)[0];
            }
            NodeKind::MemberExpression {
                property: None,
                computed: true,
            } => {
                let index = tree.children(cur)[1];
                match tree.kind(index) {
                    NodeKind::Literal { raw } => segments.push(PathSeg::Index(raw.clone())),
                    _ => return None,
                }
                cur = tree.children(cur)[0];
            }
            NodeKind::Paren => cur = tree.children(cur)[0],
            NodeKind::Identifier { name } if name == param => {
                segments.reverse();
                return match segments.split_first() {
                    Some((PathSeg::Key(root), rest)) if root == "theme" => Some(rest.to_vec()),
                    _ => None,
                };
            }
            _ => return None,
        }
    }
    None
}

/// Render a path re-rooted at the bare `theme` identifier.
pub fn accessor_text(path: &[PathSeg]) -> String {
    let mut out = String::from("theme");
    for segment in path {
        match segment {
            PathSeg::Key(name) => {
                out.push('.');
                out.push_str(name);
            }
            PathSeg::Index(raw) => {
                out.push('[');
                out.push_str(raw);
                out.push(']');
            }
        }
    }
    out
}

// ===== Template helpers =====

/// Interpolated (non-chunk) children of a template literal.
pub fn template_interpolations(tree: &SyntaxTree, template: NodeId) -> Vec<NodeId> {
    tree.children(template)
        .iter()
        .copied()
        .filter(|&child| !matches!(tree.kind(child), NodeKind::TemplateChunk))
        .collect()
}

/// Concatenated raw text of a template's chunks. Only meaningful when
/// the template has no interpolations.
pub fn template_raw_text(tree: &SyntaxTree, template: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(template) {
        if matches!(tree.kind(child), NodeKind::TemplateChunk) {
            out.push_str(tree.text_of(child));
        }
    }
    out
}

/// A tagged template whose tag is the bare identifier `css`.
pub fn is_css_tagged_template(tree: &SyntaxTree, id: NodeId) -> bool {
    if !matches!(tree.kind(id), NodeKind::TaggedTemplate) {
        return false;
    }
    let tag = unwrap_paren(tree, tree.children(id)[0]);
    matches!(tree.kind(tag), NodeKind::Identifier { name } if name == "css")
}

#[cfg(test)]
mod tests {
    use super::*;
    use restyle_js::parse;

    fn first<'t>(
        tree: &'t SyntaxTree,
        pred: impl Fn(&NodeKind) -> bool,
    ) -> NodeId {
        tree.descendants(tree.root())
            .into_iter()
            .find(|&id| pred(tree.kind(id)))
            .expect("node not found")
    }

    mod import_views {
        use super::*;

        #[test]
        fn collects_all_binding_shapes() {
            let tree = parse(
                "import styled, { css } from \"react-emotion\";\nimport * as R from \"r\";\n",
            )
            .unwrap();
            let imports = collect_imports(&tree);
            assert_eq!(imports.len(), 2);
            assert_eq!(imports[0].source, "react-emotion");
            assert_eq!(imports[0].bindings[0].imported, Imported::Default);
            assert_eq!(
                imports[0].bindings[1].imported,
                Imported::Named("css".to_string())
            );
            assert_eq!(imports[1].bindings[0].imported, Imported::Namespace);
        }

        #[test]
        fn theme_binding_detection() {
            let with = parse("import { theme } from \"./Theme\";\n").unwrap();
            assert!(has_theme_binding(&collect_imports(&with)));

            let renamed = parse("import { theme as t } from \"./Theme\";\n").unwrap();
            assert!(!has_theme_binding(&collect_imports(&renamed)));

            let default = parse("import theme from \"@jetshop/ui/utils/theme\";\n").unwrap();
            assert!(!has_theme_binding(&collect_imports(&default)));
        }
    }

    mod styled_tags {
        use super::*;

        #[test]
        fn member_call_and_bare_tags() {
            for src in [
                "const a = styled.div`x`;\n",
                "const a = styled(\"button\")`x`;\n",
                "const a = styled(Link)`x`;\n",
            ] {
                let tree = parse(src).unwrap();
                let tagged = first(&tree, |k| matches!(k, NodeKind::TaggedTemplate));
                let tag = tree.children(tagged)[0];
                assert!(tag_mentions_styled(&tree, tag), "src: {src}");
            }

            let other = parse("const a = keyframes`x`;\n").unwrap();
            let tagged = first(&other, |k| matches!(k, NodeKind::TaggedTemplate));
            assert!(!tag_mentions_styled(&other, other.children(tagged)[0]));
        }

        #[test]
        fn styled_call_is_stricter() {
            let call = parse("const a = styled(\"button\")`x`;\n").unwrap();
            let tagged = first(&call, |k| matches!(k, NodeKind::TaggedTemplate));
            assert!(tag_is_styled_call(&call, call.children(tagged)[0]));

            let member = parse("const a = styled.div`x`;\n").unwrap();
            let tagged = first(&member, |k| matches!(k, NodeKind::TaggedTemplate));
            assert!(!tag_is_styled_call(&member, member.children(tagged)[0]));
        }
    }

    mod theme_calls {
        use super::*;

        #[test]
        fn extracts_path_string() {
            let tree = parse("const c = theme(\"colors.1\");\n").unwrap();
            let call = first(&tree, |k| matches!(k, NodeKind::CallExpression));
            assert_eq!(
                theme_call_path(&tree, call),
                Ok(Some("colors.1".to_string()))
            );
        }

        #[test]
        fn non_literal_argument_is_structural() {
            let tree = parse("const c = theme(key);\n").unwrap();
            let call = first(&tree, |k| matches!(k, NodeKind::CallExpression));
            assert_eq!(theme_call_path(&tree, call), Err(()));
        }

        #[test]
        fn numeric_segments() {
            assert!(is_numeric_segment("1"));
            assert!(is_numeric_segment("42"));
            assert!(!is_numeric_segment(""));
            assert!(!is_numeric_segment("1e3"));
            assert!(!is_numeric_segment("heavy"));
        }
    }

    mod arrow_shapes {
        use super::*;

        fn classify(src: &str) -> ArrowShape {
            let tree = parse(src).unwrap();
            let arrow = first(&tree, |k| matches!(k, NodeKind::ArrowFunction { .. }));
            classify_arrow(&tree, arrow)
        }

        #[test]
        fn destructured_theme_first_property() {
            assert_eq!(
                classify("const f = ({ theme }) => theme.color.red;\n"),
                ArrowShape::DestructuredTheme
            );
        }

        #[test]
        fn destructured_other_property_abstains() {
            assert_eq!(
                classify("const f = ({ root }) => root;\n"),
                ArrowShape::NoTheme
            );
        }

        #[test]
        fn inline_css_wins_over_everything() {
            assert_eq!(
                classify("const f = ({ theme }) => theme.x || css`color: red`;\n"),
                ArrowShape::InlineCss
            );
        }

        #[test]
        fn param_theme_chain() {
            assert_eq!(
                classify("const f = props => props.theme.below.xl;\n"),
                ArrowShape::ParamTheme {
                    path: vec![
                        PathSeg::Key("below".to_string()),
                        PathSeg::Key("xl".to_string()),
                    ]
                }
            );
        }

        #[test]
        fn param_theme_computed_index() {
            assert_eq!(
                classify("const f = p => p.theme.colors[1];\n"),
                ArrowShape::ParamTheme {
                    path: vec![
                        PathSeg::Key("colors".to_string()),
                        PathSeg::Index("1".to_string()),
                    ]
                }
            );
        }

        #[test]
        fn theme_in_larger_expression_is_not_resolvable() {
            assert_eq!(
                classify("const f = p => p.theme.space + 1;\n"),
                ArrowShape::ThemeNotResolvable
            );
        }

        #[test]
        fn unrelated_param_is_silent() {
            assert_eq!(
                classify("const f = p => p.color;\n"),
                ArrowShape::NoTheme
            );
        }

        #[test]
        fn accessor_text_formats_segments() {
            let path = vec![
                PathSeg::Key("colors".to_string()),
                PathSeg::Index("1".to_string()),
            ];
            assert_eq!(accessor_text(&path), "theme.colors[1]");
        }
    }
}
