//! Lossless JS/JSX parsing and printing for the restyle codemod engine.
//!
//! The parser covers the syntactic subset the rewrite rules pattern-match
//! against: imports, variable declarations, arrow functions, tagged
//! templates, member/call expressions, JSX attributes, template literals,
//! logical/conditional expressions, object expressions, literals, and
//! identifiers. Statements outside that subset degrade to opaque spanned
//! nodes that round-trip verbatim and are never rewritten.
//!
//! Every node carries the byte span it occupies in the original source;
//! the serializer reproduces untouched regions byte-for-byte by
//! interleaving verbatim source gaps with children in span order.

pub mod ast;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use ast::{Node, NodeId, NodeKind, SyntaxTree};
pub use parser::{parse, ParseError};
pub use serializer::{render_node, serialize};
