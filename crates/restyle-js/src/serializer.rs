//! Span-preserving serializer.
//!
//! Clean nodes print as original source: the gap before each child is
//! copied verbatim from the source text, children recurse in span
//! order, and the tail gap after the last child is copied too. A tree
//! with no dirty nodes therefore serializes byte-for-byte identical to
//! its input, whitespace and comments included.
//!
//! Dirty nodes print from their own content instead: [`NodeKind::Raw`]
//! emits its stored text, and a rewritten [`NodeKind::ImportDeclaration`]
//! is formatted from its specifier children. Inserted nodes carry empty
//! spans, so they cost nothing in the surrounding gap arithmetic.

use crate::ast::{NodeId, NodeKind, SyntaxTree};

/// Serialize the whole tree.
pub fn serialize(tree: &SyntaxTree) -> String {
    let mut out = String::with_capacity(tree.source().len());
    emit(tree, tree.root(), &mut out);
    out
}

/// Render a single node (and its subtree) to text.
///
/// Rules use this to turn a subtree into replacement text before a
/// [`SyntaxTree::replace_raw`] call.
pub fn render_node(tree: &SyntaxTree, id: NodeId) -> String {
    let mut out = String::new();
    emit(tree, id, &mut out);
    out
}

fn emit(tree: &SyntaxTree, id: NodeId, out: &mut String) {
    let node = tree.node(id);

    if node.dirty {
        match &node.kind {
            NodeKind::Raw { text } => out.push_str(text),
            NodeKind::ImportDeclaration { source } => print_import(tree, id, source, out),
            // Structured replacement of other kinds is not part of the
            // mutation API; fall back to span text so nothing is lost.
            _ => out.push_str(tree.text_of(id)),
        }
        return;
    }

    let span = node.span;
    let mut pos = span.start;
    for &child in &node.children {
        let child_span = tree.span_of(child);
        if !child_span.is_empty() {
            debug_assert!(pos <= child_span.start, "children out of span order");
            out.push_str(tree.slice(restyle_core::Span::new(pos, child_span.start)));
        }
        emit(tree, child, out);
        pos = pos.max(child_span.end);
    }
    out.push_str(tree.slice(restyle_core::Span::new(pos, span.end)));
}

/// Format a rewritten import declaration from its specifier children.
///
/// An empty span means the node was inserted rather than rewritten in
/// place; inserted imports start on their own line.
fn print_import(tree: &SyntaxTree, id: NodeId, source: &str, out: &mut String) {
    if tree.span_of(id).is_empty() {
        out.push('\n');
    }
    let mut default: Option<&str> = None;
    let mut namespace: Option<&str> = None;
    let mut named: Vec<String> = Vec::new();

    for &child in tree.children(id) {
        match tree.kind(child) {
            NodeKind::ImportDefaultSpecifier { local } => default = Some(local),
            NodeKind::ImportNamespaceSpecifier { local } => namespace = Some(local),
            NodeKind::ImportNamedSpecifier { imported, local } => {
                if imported == local {
                    named.push(imported.clone());
                } else {
                    named.push(format!("{} as {}", imported, local));
                }
            }
            _ => {}
        }
    }

    out.push_str("import ");
    let mut wrote_clause = false;
    if let Some(local) = default {
        out.push_str(local);
        wrote_clause = true;
    }
    if let Some(local) = namespace {
        if wrote_clause {
            out.push_str(", ");
        }
        out.push_str("* as ");
        out.push_str(local);
        wrote_clause = true;
    }
    if !named.is_empty() {
        if wrote_clause {
            out.push_str(", ");
        }
        out.push_str("{ ");
        out.push_str(&named.join(", "));
        out.push_str(" }");
        wrote_clause = true;
    }
    if wrote_clause {
        out.push_str(" from ");
    }
    out.push('"');
    out.push_str(source);
    out.push_str("\";");
}
