//! Arena-backed syntax tree with byte spans.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]
//! index, so rewrite rules can hold ids across mutations without borrow
//! conflicts. Mutation happens by overwriting arena slots in place:
//! [`SyntaxTree::replace`] swaps a node's kind and children while
//! keeping its original span, and [`SyntaxTree::replace_raw`] swaps in
//! pre-rendered text. Replaced nodes keep their span so the serializer
//! still knows which stretch of original source they stand in for.

use restyle_core::{text, Span};

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_raw(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Structural classification of a node.
///
/// Fields hold the small amount of derived data rules match on (names,
/// operators, literal text); everything positional comes from spans and
/// children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root. Children are top-level statements in source order.
    Program,

    // ===== Statements =====
    /// `import ... from "source";` — children are specifier nodes.
    ImportDeclaration { source: String },
    /// `default` binding in an import.
    ImportDefaultSpecifier { local: String },
    /// `{ imported as local }` member of an import.
    ImportNamedSpecifier { imported: String, local: String },
    /// `* as local` in an import.
    ImportNamespaceSpecifier { local: String },
    /// `const`/`let`/`var` statement; children are declarators.
    VariableDeclaration { keyword: String },
    /// One `name = init` binding; child 0 (if present) is the initializer.
    VariableDeclarator { name: String },
    /// Statement wrapping a bare expression (child 0).
    ExpressionStatement,
    /// `return expr;` — child 0 is the argument, if any.
    ReturnStatement,
    /// `if (cond) cons [else alt]` — children in source order.
    IfStatement,
    /// `{ ... }` statement block.
    Block,
    /// `export` with a declaration or specifier list (children).
    ExportNamed,
    /// `export default expr` — child 0 is the expression.
    ExportDefault,
    /// `function name(...) { ... }` — child 0 is the body block.
    FunctionDeclaration { name: String },
    /// Statement the parser does not model. Round-trips verbatim and is
    /// never rewritten.
    Opaque,

    // ===== Expressions =====
    Identifier { name: String },
    /// String/number/boolean/null/regex literal, text as written.
    Literal { raw: String },
    /// Template literal; children are [`NodeKind::TemplateChunk`] and
    /// interpolated expressions in source order. Backticks and `${`/`}`
    /// live in the gaps between children.
    TemplateLiteral,
    /// Raw text run inside a template literal.
    TemplateChunk,
    /// `tag`template`` — children are `[tag, template]`.
    TaggedTemplate,
    /// Arrow function. The first `param_count` children are parameter
    /// patterns; the last child is the body (expression or block).
    ArrowFunction { param_count: usize },
    /// `{ a, b: c, ...rest }` destructuring pattern; children are
    /// pattern properties and rest elements.
    ObjectPattern,
    /// One `key` or `key: local` property of an object pattern.
    PatternProperty { key: String, local: String },
    /// `...local` in a pattern.
    RestElement { local: String },
    /// Call; children are `[callee, args...]`.
    CallExpression,
    /// `new Expr(args)`; child 0 is the callee expression (including
    /// any call arguments).
    NewExpression,
    /// Member access. `property` is `Some` for static `.name` access;
    /// computed `[expr]` access has `property: None`, `computed: true`
    /// and children `[object, index]`.
    MemberExpression {
        property: Option<String>,
        computed: bool,
    },
    /// `a || b`, `a && b`, `a ?? b`; children `[left, right]`.
    LogicalExpression { operator: String },
    /// Arithmetic/comparison binary op; children `[left, right]`.
    BinaryExpression { operator: String },
    /// Prefix unary op; child 0 is the operand.
    UnaryExpression { operator: String },
    /// `lvalue = value`; children `[target, value]`.
    AssignmentExpression,
    /// `test ? cons : alt`; children in source order.
    ConditionalExpression,
    /// `{ ... }` expression; children are properties and spreads.
    ObjectExpression,
    /// `key: value` property. `shorthand` properties have no value
    /// child; computed keys put the key expression first in children.
    ObjectProperty {
        key: String,
        computed: bool,
        shorthand: bool,
    },
    /// `...expr`; child 0 is the argument.
    SpreadElement,
    /// `[ ... ]`; children are elements.
    ArrayExpression,
    /// Parenthesized expression; child 0 is the inner expression.
    Paren,
    /// `function (...) { ... }` expression; child 0 is the body block.
    FunctionExpression,

    // ===== JSX =====
    /// Element or fragment (`name` is empty for fragments). Children are
    /// attributes followed by child elements/text/containers.
    JsxElement { name: String },
    /// `name="value"` or `name={expr}`; the value, if any, is child 0.
    JsxAttribute { name: String },
    /// `{...expr}` attribute; child 0 is the argument.
    JsxSpreadAttribute,
    /// `{expr}` inside element children or as an attribute value.
    /// May be empty (comment-only containers).
    JsxExpressionContainer,
    /// Raw text between JSX children.
    JsxText,

    // ===== Synthetic =====
    /// Pre-rendered replacement text. Prints verbatim.
    Raw { text: String },
}

/// One arena slot.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Set when the node was replaced or inserted; the serializer prints
    /// dirty nodes from structure or stored text instead of source bytes.
    pub dirty: bool,
}

/// Syntax tree over one file's source text.
#[derive(Debug)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub(crate) fn from_parts(source: String, nodes: Vec<Node>, root: NodeId) -> Self {
        SyntaxTree {
            source,
            nodes,
            root,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn span_of(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    /// Source text covered by a span.
    pub fn slice(&self, span: Span) -> &str {
        &self.source[span.start..span.end]
    }

    /// Original source text covered by a node's span.
    pub fn text_of(&self, id: NodeId) -> &str {
        self.slice(self.span_of(id))
    }

    /// 1-indexed source line a node starts on.
    pub fn line_of(&self, id: NodeId) -> u32 {
        text::line_of_offset(&self.source, self.span_of(id).start)
    }

    /// Preorder walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            for &child in self.children(next).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Allocate a new node and link its children's parent pointers.
    pub fn alloc(&mut self, kind: NodeKind, span: Span, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for &child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            span,
            children,
            parent: None,
            dirty: false,
        });
        id
    }

    /// Overwrite a node in place with new structure.
    ///
    /// The span is kept: the node still stands in for the same stretch
    /// of original source, it just prints differently now.
    pub fn replace(&mut self, id: NodeId, kind: NodeKind, children: Vec<NodeId>) {
        for &child in &children {
            self.nodes[child.index()].parent = Some(id);
        }
        let node = &mut self.nodes[id.index()];
        node.kind = kind;
        node.children = children;
        node.dirty = true;
    }

    /// Overwrite a node in place with pre-rendered text.
    pub fn replace_raw(&mut self, id: NodeId, text: impl Into<String>) {
        self.replace(id, NodeKind::Raw { text: text.into() }, Vec::new());
    }

    /// Insert `child` into `parent`'s child list immediately after
    /// `anchor`. The child should carry an empty span at the anchor's
    /// end so serialization gaps stay well ordered.
    pub fn insert_after(&mut self, parent: NodeId, anchor: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[child.index()].dirty = true;
        let children = &mut self.nodes[parent.index()].children;
        let at = children
            .iter()
            .position(|&c| c == anchor)
            .map(|i| i + 1)
            .unwrap_or(children.len());
        children.insert(at, child);
    }

    /// Insert `child` as the first child of `parent`.
    pub fn insert_first(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[child.index()].dirty = true;
        self.nodes[parent.index()].children.insert(0, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tree: &mut SyntaxTree, name: &str, start: usize, end: usize) -> NodeId {
        tree.alloc(
            NodeKind::Identifier {
                name: name.to_string(),
            },
            Span::new(start, end),
            Vec::new(),
        )
    }

    fn empty_tree(source: &str) -> SyntaxTree {
        let root = Node {
            kind: NodeKind::Program,
            span: Span::new(0, source.len()),
            children: Vec::new(),
            parent: None,
            dirty: false,
        };
        SyntaxTree::from_parts(source.to_string(), vec![root], NodeId(0))
    }

    #[test]
    fn alloc_links_parents() {
        let mut tree = empty_tree("a b");
        let a = leaf(&mut tree, "a", 0, 1);
        let b = leaf(&mut tree, "b", 2, 3);
        let stmt = tree.alloc(NodeKind::ExpressionStatement, Span::new(0, 3), vec![a, b]);
        assert_eq!(tree.parent(a), Some(stmt));
        assert_eq!(tree.parent(b), Some(stmt));
    }

    #[test]
    fn replace_keeps_span_and_marks_dirty() {
        let mut tree = empty_tree("abc");
        let id = leaf(&mut tree, "abc", 0, 3);
        tree.replace_raw(id, "xyz");
        assert!(tree.node(id).dirty);
        assert_eq!(tree.span_of(id), Span::new(0, 3));
        assert!(matches!(tree.kind(id), NodeKind::Raw { text } if text == "xyz"));
    }

    #[test]
    fn insert_after_positions_child() {
        let mut tree = empty_tree("a b");
        let a = leaf(&mut tree, "a", 0, 1);
        let b = leaf(&mut tree, "b", 2, 3);
        let root = tree.root();
        tree.replace(root, NodeKind::Program, vec![a, b]);

        let new = tree.alloc(
            NodeKind::Raw {
                text: "!".to_string(),
            },
            Span::empty(1),
            Vec::new(),
        );
        tree.insert_after(root, a, new);
        assert_eq!(tree.children(root), &[a, new, b]);
        assert!(tree.node(new).dirty);
    }

    #[test]
    fn descendants_preorder() {
        let mut tree = empty_tree("a b c");
        let a = leaf(&mut tree, "a", 0, 1);
        let b = leaf(&mut tree, "b", 2, 3);
        let inner = tree.alloc(NodeKind::Paren, Span::new(0, 3), vec![a, b]);
        let c = leaf(&mut tree, "c", 4, 5);
        let outer = tree.alloc(NodeKind::ExpressionStatement, Span::new(0, 5), vec![inner, c]);

        assert_eq!(tree.descendants(outer), vec![outer, inner, a, b, c]);
    }
}
