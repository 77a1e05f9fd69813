//! Recursive-descent parser producing a lossless, span-preserving tree.
//!
//! The parser models only the syntax the rewrite rules inspect. Any
//! statement outside that subset is recovered as an [`NodeKind::Opaque`]
//! node via a balanced token scan, so unfamiliar code never aborts a
//! file and always round-trips verbatim.
//!
//! Recovery works with checkpoints: before each statement the parser
//! saves lexer state and arena length; a recoverable loss of sync
//! ([`Fail::Lost`]) rewinds both and re-scans the statement opaquely.
//! Only structurally unrecoverable input (an unterminated string,
//! template, or comment, or unbalanced brackets at end of input) is a
//! fatal [`ParseError`] for the file.

use restyle_core::{text, Span};
use thiserror::Error;

use crate::ast::{Node, NodeId, NodeKind, SyntaxTree};
use crate::tokenizer::{LexState, Lexer, Punct, TemplateDelim, Token, TokenKind};

/// Fatal, per-file parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error on line {line}: {message}")]
pub struct ParseError {
    /// 1-indexed line of the failure.
    pub line: u32,
    pub message: String,
}

/// Internal parse outcome.
///
/// `Lost` means the current construct is outside the modeled subset;
/// the caller rewinds and falls back to an opaque scan. `Fatal` aborts
/// the file.
enum Fail {
    Lost,
    Fatal(ParseError),
}

impl From<ParseError> for Fail {
    fn from(err: ParseError) -> Self {
        Fail::Fatal(err)
    }
}

type PResult<T> = Result<T, Fail>;

/// Parse a source file into a [`SyntaxTree`].
pub fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    let mut parser = Parser::new(source);
    let mut statements = Vec::new();

    loop {
        let tok = match parser.peek() {
            Ok(tok) => tok,
            Err(fail) => return Err(parser.into_parse_error(fail)),
        };
        if tok.kind == TokenKind::Eof {
            break;
        }
        match parser.parse_statement_with_recovery() {
            Ok(id) => statements.push(id),
            Err(fail) => return Err(parser.into_parse_error(fail)),
        }
    }

    let root = parser.alloc(NodeKind::Program, Span::new(0, source.len()), statements);
    Ok(SyntaxTree::from_parts(
        source.to_string(),
        parser.nodes,
        root,
    ))
}

/// Saved parser state for speculative parsing and statement recovery.
struct Checkpoint {
    lex: LexState,
    peeked: Option<Token>,
    nodes_len: usize,
}

struct Parser<'s> {
    source: &'s str,
    lexer: Lexer<'s>,
    peeked: Option<Token>,
    nodes: Vec<Node>,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Parser {
            source,
            lexer: Lexer::new(source),
            peeked: None,
            nodes: Vec::new(),
        }
    }

    // ===== Infrastructure =====

    fn alloc(&mut self, kind: NodeKind, span: Span, children: Vec<NodeId>) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len());
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

    fn span_of(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            lex: self.lexer.state(),
            peeked: self.peeked,
            nodes_len: self.nodes.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.lexer.restore(checkpoint.lex);
        self.peeked = checkpoint.peeked;
        self.nodes.truncate(checkpoint.nodes_len);
    }

    fn fatal(&self, at: usize, message: impl Into<String>) -> Fail {
        Fail::Fatal(ParseError {
            line: text::line_of_offset(self.source, at),
            message: message.into(),
        })
    }

    fn into_parse_error(&self, fail: Fail) -> ParseError {
        match fail {
            Fail::Fatal(err) => err,
            Fail::Lost => ParseError {
                line: text::line_of_offset(self.source, self.lexer.pos()),
                message: "unsupported syntax".to_string(),
            },
        }
    }

    fn peek(&mut self) -> PResult<Token> {
        if let Some(tok) = self.peeked {
            return Ok(tok);
        }
        let tok = self.lexer.next_token()?;
        self.peeked = Some(tok);
        Ok(tok)
    }

    fn bump(&mut self) -> PResult<Token> {
        if let Some(tok) = self.peeked.take() {
            return Ok(tok);
        }
        Ok(self.lexer.next_token()?)
    }

    fn text(&self, tok: Token) -> &'s str {
        self.lexer.text(tok.span)
    }

    fn at_punct(&mut self, punct: Punct) -> PResult<bool> {
        Ok(self.peek()?.kind == TokenKind::Punct(punct))
    }

    fn eat_punct(&mut self, punct: Punct) -> PResult<Option<Token>> {
        if self.at_punct(punct)? {
            Ok(Some(self.bump()?))
        } else {
            Ok(None)
        }
    }

    fn expect_punct(&mut self, punct: Punct) -> PResult<Token> {
        match self.eat_punct(punct)? {
            Some(tok) => Ok(tok),
            None => Err(Fail::Lost),
        }
    }

    fn at_keyword(&mut self, word: &str) -> PResult<bool> {
        let tok = self.peek()?;
        Ok(tok.kind == TokenKind::Ident && self.text(tok) == word)
    }

    fn expect_ident(&mut self) -> PResult<Token> {
        let tok = self.bump()?;
        if tok.kind == TokenKind::Ident {
            Ok(tok)
        } else {
            Err(Fail::Lost)
        }
    }

    // ===== Statements =====

    fn parse_statement_with_recovery(&mut self) -> PResult<NodeId> {
        let checkpoint = self.checkpoint();
        match self.parse_statement() {
            Ok(id) => Ok(id),
            Err(Fail::Fatal(err)) => Err(Fail::Fatal(err)),
            Err(Fail::Lost) => {
                self.restore(checkpoint);
                self.parse_opaque_statement()
            }
        }
    }

    fn parse_statement(&mut self) -> PResult<NodeId> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Ident => match self.text(tok) {
                "import" => self.parse_import(),
                "export" => self.parse_export(),
                "const" | "let" | "var" => self.parse_variable_declaration(),
                "function" => self.parse_function(true),
                "return" => self.parse_return(),
                "if" => self.parse_if(),
                // Constructs the rules never inspect scan faster opaquely.
                "for" | "while" | "do" | "switch" | "try" | "class" | "throw" => {
                    self.parse_opaque_statement()
                }
                _ => self.parse_expression_statement(),
            },
            TokenKind::Punct(Punct::LBrace) => self.parse_block(),
            TokenKind::Punct(Punct::Semi) => {
                let semi = self.bump()?;
                Ok(self.alloc(NodeKind::Opaque, semi.span, Vec::new()))
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// Balanced token scan producing an [`NodeKind::Opaque`] statement.
    ///
    /// Consumes to a `;` at depth zero, or stops before a `}` that would
    /// close an enclosing block. A `}` that returns the scan itself to
    /// depth zero ends the statement too (block-bodied constructs like
    /// loops and classes have no trailing semicolon).
    fn parse_opaque_statement(&mut self) -> PResult<NodeId> {
        let start_tok = self.peek()?;
        let start = start_tok.span.start;
        let mut end = start;
        let mut depth = 0usize;
        let mut consumed_any = false;

        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Eof => {
                    if depth > 0 {
                        return Err(self.fatal(tok.span.start, "unbalanced brackets at end of input"));
                    }
                    break;
                }
                TokenKind::Punct(Punct::Semi) if depth == 0 => {
                    let semi = self.bump()?;
                    end = semi.span.end;
                    break;
                }
                TokenKind::Punct(Punct::LParen | Punct::LBrace | Punct::LBracket) => {
                    depth += 1;
                    let tok = self.bump()?;
                    end = tok.span.end;
                    consumed_any = true;
                }
                TokenKind::Punct(Punct::RParen | Punct::RBrace | Punct::RBracket) => {
                    if depth == 0 {
                        if !consumed_any {
                            // Stray closer: swallow it as its own opaque
                            // statement so the scan always makes progress.
                            let tok = self.bump()?;
                            end = tok.span.end;
                        }
                        break;
                    }
                    depth -= 1;
                    let closer = self.bump()?;
                    end = closer.span.end;
                    consumed_any = true;
                    if depth == 0 && closer.kind == TokenKind::Punct(Punct::RBrace) {
                        break;
                    }
                }
                TokenKind::Template => {
                    let tok = self.bump()?;
                    self.skip_template_raw()?;
                    end = self.lexer.pos().max(tok.span.end);
                    consumed_any = true;
                }
                _ => {
                    let tok = self.bump()?;
                    end = tok.span.end;
                    consumed_any = true;
                }
            }
        }

        Ok(self.alloc(NodeKind::Opaque, Span::new(start, end), Vec::new()))
    }

    /// Skip a template literal body during an opaque scan. The opening
    /// backtick token was already consumed.
    fn skip_template_raw(&mut self) -> PResult<()> {
        debug_assert!(self.peeked.is_none());
        loop {
            let (_, delim) = self.lexer.template_chunk()?;
            match delim {
                TemplateDelim::End => return Ok(()),
                TemplateDelim::Interp => {
                    let mut depth = 0usize;
                    loop {
                        let tok = self.bump()?;
                        match tok.kind {
                            TokenKind::Eof => {
                                return Err(
                                    self.fatal(tok.span.start, "unterminated template literal")
                                );
                            }
                            TokenKind::Punct(Punct::LBrace) => depth += 1,
                            TokenKind::Punct(Punct::RBrace) => {
                                if depth == 0 {
                                    break;
                                }
                                depth -= 1;
                            }
                            TokenKind::Template => self.skip_template_raw()?,
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    /// Consume a balanced bracketed region starting at the current
    /// (opening) token, returning its span.
    fn consume_balanced(&mut self) -> PResult<Span> {
        let open = self.bump()?;
        let start = open.span.start;
        let mut depth = 1usize;
        loop {
            let tok = self.bump()?;
            match tok.kind {
                TokenKind::Eof => {
                    return Err(self.fatal(tok.span.start, "unbalanced brackets at end of input"));
                }
                TokenKind::Punct(Punct::LParen | Punct::LBrace | Punct::LBracket) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBrace | Punct::RBracket) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Span::new(start, tok.span.end));
                    }
                }
                TokenKind::Template => self.skip_template_raw()?,
                _ => {}
            }
        }
    }

    fn parse_import(&mut self) -> PResult<NodeId> {
        let import_kw = self.bump()?;
        let start = import_kw.span.start;
        let mut specifiers = Vec::new();

        let next = self.peek()?;
        let (source, clause_end) = if next.kind == TokenKind::Str {
            // Side-effect import.
            let src = self.bump()?;
            (unquote(self.text(src)).to_string(), src.span.end)
        } else {
            // Import clause: default and/or namespace and/or named.
            if next.kind == TokenKind::Ident && self.text(next) != "from" {
                let local = self.bump()?;
                specifiers.push(self.alloc(
                    NodeKind::ImportDefaultSpecifier {
                        local: self.lexer.text(local.span).to_string(),
                    },
                    local.span,
                    Vec::new(),
                ));
                self.eat_punct(Punct::Comma)?;
            }
            if self.at_punct(Punct::Star)? {
                let star = self.bump()?;
                if !self.at_keyword("as")? {
                    return Err(Fail::Lost);
                }
                self.bump()?;
                let local = self.expect_ident()?;
                specifiers.push(self.alloc(
                    NodeKind::ImportNamespaceSpecifier {
                        local: self.text(local).to_string(),
                    },
                    Span::new(star.span.start, local.span.end),
                    Vec::new(),
                ));
            } else if self.at_punct(Punct::LBrace)? {
                self.bump()?;
                loop {
                    if self.eat_punct(Punct::RBrace)?.is_some() {
                        break;
                    }
                    let imported = self.expect_ident()?;
                    let mut local = imported;
                    if self.at_keyword("as")? {
                        self.bump()?;
                        local = self.expect_ident()?;
                    }
                    specifiers.push(self.alloc(
                        NodeKind::ImportNamedSpecifier {
                            imported: self.text(imported).to_string(),
                            local: self.text(local).to_string(),
                        },
                        Span::new(imported.span.start, local.span.end),
                        Vec::new(),
                    ));
                    if self.eat_punct(Punct::Comma)?.is_none() {
                        self.expect_punct(Punct::RBrace)?;
                        break;
                    }
                }
            }
            if !self.at_keyword("from")? {
                return Err(Fail::Lost);
            }
            self.bump()?;
            let src = self.bump()?;
            if src.kind != TokenKind::Str {
                return Err(Fail::Lost);
            }
            (unquote(self.text(src)).to_string(), src.span.end)
        };

        let mut end = clause_end;
        if let Some(semi) = self.eat_punct(Punct::Semi)? {
            end = semi.span.end;
        }

        Ok(self.alloc(
            NodeKind::ImportDeclaration { source },
            Span::new(start, end),
            specifiers,
        ))
    }

    fn parse_export(&mut self) -> PResult<NodeId> {
        let export_kw = self.bump()?;
        let start = export_kw.span.start;

        if self.at_keyword("default")? {
            self.bump()?;
            let expr = self.parse_assignment()?;
            let mut end = self.span_of(expr).end;
            if let Some(semi) = self.eat_punct(Punct::Semi)? {
                end = semi.span.end;
            }
            return Ok(self.alloc(NodeKind::ExportDefault, Span::new(start, end), vec![expr]));
        }

        let tok = self.peek()?;
        if tok.kind == TokenKind::Ident {
            let decl = match self.text(tok) {
                "const" | "let" | "var" => self.parse_variable_declaration()?,
                "function" => self.parse_function(true)?,
                _ => return Err(Fail::Lost),
            };
            let end = self.span_of(decl).end;
            return Ok(self.alloc(NodeKind::ExportNamed, Span::new(start, end), vec![decl]));
        }

        if tok.kind == TokenKind::Punct(Punct::LBrace) {
            // Specifier list, optionally re-exported from a module.
            let list = self.consume_balanced()?;
            let mut end = list.end;
            if self.at_keyword("from")? {
                self.bump()?;
                let src = self.bump()?;
                if src.kind != TokenKind::Str {
                    return Err(Fail::Lost);
                }
                end = src.span.end;
            }
            if let Some(semi) = self.eat_punct(Punct::Semi)? {
                end = semi.span.end;
            }
            return Ok(self.alloc(NodeKind::ExportNamed, Span::new(start, end), Vec::new()));
        }

        if tok.kind == TokenKind::Punct(Punct::Star) {
            self.bump()?;
            if !self.at_keyword("from")? {
                return Err(Fail::Lost);
            }
            self.bump()?;
            let src = self.bump()?;
            if src.kind != TokenKind::Str {
                return Err(Fail::Lost);
            }
            let mut end = src.span.end;
            if let Some(semi) = self.eat_punct(Punct::Semi)? {
                end = semi.span.end;
            }
            return Ok(self.alloc(NodeKind::ExportNamed, Span::new(start, end), Vec::new()));
        }

        Err(Fail::Lost)
    }

    fn parse_variable_declaration(&mut self) -> PResult<NodeId> {
        let keyword = self.bump()?;
        let start = keyword.span.start;
        let mut declarators = Vec::new();

        loop {
            let declarator = self.parse_variable_declarator()?;
            declarators.push(declarator);
            if self.eat_punct(Punct::Comma)?.is_none() {
                break;
            }
        }

        let mut end = declarators
            .last()
            .map(|&d| self.span_of(d).end)
            .unwrap_or(keyword.span.end);
        if let Some(semi) = self.eat_punct(Punct::Semi)? {
            end = semi.span.end;
        }

        Ok(self.alloc(
            NodeKind::VariableDeclaration {
                keyword: self.lexer.text(keyword.span).to_string(),
            },
            Span::new(start, end),
            declarators,
        ))
    }

    fn parse_variable_declarator(&mut self) -> PResult<NodeId> {
        let tok = self.peek()?;
        let (name, name_span) = match tok.kind {
            TokenKind::Ident => {
                let ident = self.bump()?;
                (self.text(ident).to_string(), ident.span)
            }
            TokenKind::Punct(Punct::LBrace | Punct::LBracket) => {
                // Destructuring target kept as raw pattern text.
                let span = self.consume_balanced()?;
                (self.lexer.text(span).to_string(), span)
            }
            _ => return Err(Fail::Lost),
        };

        let mut children = Vec::new();
        let mut end = name_span.end;
        if self.eat_punct(Punct::Eq)?.is_some() {
            let init = self.parse_assignment()?;
            end = self.span_of(init).end;
            children.push(init);
        }

        Ok(self.alloc(
            NodeKind::VariableDeclarator { name },
            Span::new(name_span.start, end),
            children,
        ))
    }

    fn parse_function(&mut self, declaration: bool) -> PResult<NodeId> {
        let function_kw = self.bump()?;
        let start = function_kw.span.start;

        let mut name = String::new();
        if self.peek()?.kind == TokenKind::Ident {
            let ident = self.bump()?;
            name = self.text(ident).to_string();
        }
        if !self.at_punct(Punct::LParen)? {
            return Err(Fail::Lost);
        }
        self.consume_balanced()?;
        if !self.at_punct(Punct::LBrace)? {
            return Err(Fail::Lost);
        }
        let body = self.parse_block()?;
        let end = self.span_of(body).end;

        let kind = if declaration {
            NodeKind::FunctionDeclaration { name }
        } else {
            NodeKind::FunctionExpression
        };
        Ok(self.alloc(kind, Span::new(start, end), vec![body]))
    }

    fn parse_return(&mut self) -> PResult<NodeId> {
        let return_kw = self.bump()?;
        let start = return_kw.span.start;
        let mut children = Vec::new();
        let mut end = return_kw.span.end;

        let next = self.peek()?;
        let has_argument = !matches!(
            next.kind,
            TokenKind::Eof | TokenKind::Punct(Punct::Semi | Punct::RBrace)
        );
        if has_argument {
            let arg = self.parse_assignment()?;
            end = self.span_of(arg).end;
            children.push(arg);
        }
        if let Some(semi) = self.eat_punct(Punct::Semi)? {
            end = semi.span.end;
        }

        Ok(self.alloc(NodeKind::ReturnStatement, Span::new(start, end), children))
    }

    fn parse_if(&mut self) -> PResult<NodeId> {
        let if_kw = self.bump()?;
        let start = if_kw.span.start;
        self.expect_punct(Punct::LParen)?;
        let condition = self.parse_assignment()?;
        self.expect_punct(Punct::RParen)?;
        let consequent = self.parse_statement_with_recovery()?;
        let mut end = self.span_of(consequent).end;
        let mut children = vec![condition, consequent];

        if self.at_keyword("else")? {
            self.bump()?;
            let alternate = self.parse_statement_with_recovery()?;
            end = self.span_of(alternate).end;
            children.push(alternate);
        }

        Ok(self.alloc(NodeKind::IfStatement, Span::new(start, end), children))
    }

    fn parse_block(&mut self) -> PResult<NodeId> {
        let open = self.bump()?;
        let start = open.span.start;
        let mut statements = Vec::new();

        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Punct(Punct::RBrace) => {
                    let close = self.bump()?;
                    return Ok(self.alloc(
                        NodeKind::Block,
                        Span::new(start, close.span.end),
                        statements,
                    ));
                }
                TokenKind::Eof => {
                    return Err(self.fatal(tok.span.start, "unbalanced brackets at end of input"));
                }
                _ => statements.push(self.parse_statement_with_recovery()?),
            }
        }
    }

    fn parse_expression_statement(&mut self) -> PResult<NodeId> {
        let expr = self.parse_assignment()?;
        let start = self.span_of(expr).start;
        let mut end = self.span_of(expr).end;
        if let Some(semi) = self.eat_punct(Punct::Semi)? {
            end = semi.span.end;
        }
        Ok(self.alloc(
            NodeKind::ExpressionStatement,
            Span::new(start, end),
            vec![expr],
        ))
    }

    // ===== Expressions =====

    fn parse_assignment(&mut self) -> PResult<NodeId> {
        let left = self.parse_conditional()?;
        if self.at_punct(Punct::Eq)? {
            let assignable = matches!(
                self.nodes[left.index()].kind,
                NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. }
            );
            if !assignable {
                return Err(Fail::Lost);
            }
            self.bump()?;
            let right = self.parse_assignment()?;
            let span = Span::new(self.span_of(left).start, self.span_of(right).end);
            return Ok(self.alloc(NodeKind::AssignmentExpression, span, vec![left, right]));
        }
        Ok(left)
    }

    fn parse_conditional(&mut self) -> PResult<NodeId> {
        let test = self.parse_binary(1)?;
        if self.at_punct(Punct::Question)? {
            self.bump()?;
            let consequent = self.parse_assignment()?;
            self.expect_punct(Punct::Colon)?;
            let alternate = self.parse_assignment()?;
            let span = Span::new(self.span_of(test).start, self.span_of(alternate).end);
            return Ok(self.alloc(
                NodeKind::ConditionalExpression,
                span,
                vec![test, consequent, alternate],
            ));
        }
        Ok(test)
    }

    /// Binary operator precedence; `None` for non-operators.
    fn binary_precedence(&self, tok: Token) -> Option<(u8, bool)> {
        match tok.kind {
            TokenKind::Punct(p) => {
                let entry = match p {
                    Punct::PipePipe | Punct::QuestionQuestion => (1, true),
                    Punct::AmpAmp => (2, true),
                    Punct::Pipe => (3, false),
                    Punct::Caret => (4, false),
                    Punct::Amp => (5, false),
                    Punct::EqEq | Punct::EqEqEq | Punct::NotEq | Punct::NotEqEq => (6, false),
                    Punct::Lt | Punct::Gt | Punct::LtEq | Punct::GtEq => (7, false),
                    Punct::Plus | Punct::Minus => (8, false),
                    Punct::Star | Punct::Slash | Punct::Percent => (9, false),
                    _ => return None,
                };
                Some(entry)
            }
            TokenKind::Ident if matches!(self.text(tok), "instanceof" | "in") => Some((7, false)),
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_precedence: u8) -> PResult<NodeId> {
        let mut left = self.parse_unary()?;
        loop {
            let tok = self.peek()?;
            let Some((precedence, logical)) = self.binary_precedence(tok) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            let operator = self.text(tok).to_string();
            self.bump()?;
            let right = self.parse_binary(precedence + 1)?;
            let span = Span::new(self.span_of(left).start, self.span_of(right).end);
            let kind = if logical {
                NodeKind::LogicalExpression { operator }
            } else {
                NodeKind::BinaryExpression { operator }
            };
            left = self.alloc(kind, span, vec![left, right]);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<NodeId> {
        let tok = self.peek()?;
        let is_unary = match tok.kind {
            TokenKind::Punct(Punct::Not | Punct::Tilde | Punct::Plus | Punct::Minus) => true,
            TokenKind::Ident => matches!(self.text(tok), "typeof" | "void" | "delete" | "await"),
            _ => false,
        };
        if is_unary {
            let operator = self.text(tok).to_string();
            let op = self.bump()?;
            let operand = self.parse_unary()?;
            let span = Span::new(op.span.start, self.span_of(operand).end);
            return Ok(self.alloc(
                NodeKind::UnaryExpression { operator },
                span,
                vec![operand],
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<NodeId> {
        let mut expr = self.parse_primary()?;
        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Punct(Punct::Dot) => {
                    self.bump()?;
                    let property = self.expect_ident()?;
                    let span = Span::new(self.span_of(expr).start, property.span.end);
                    expr = self.alloc(
                        NodeKind::MemberExpression {
                            property: Some(self.text(property).to_string()),
                            computed: false,
                        },
                        span,
                        vec![expr],
                    );
                }
                TokenKind::Punct(Punct::LBracket) => {
                    self.bump()?;
                    let index = self.parse_assignment()?;
                    let close = self.expect_punct(Punct::RBracket)?;
                    let span = Span::new(self.span_of(expr).start, close.span.end);
                    expr = self.alloc(
                        NodeKind::MemberExpression {
                            property: None,
                            computed: true,
                        },
                        span,
                        vec![expr, index],
                    );
                }
                TokenKind::Punct(Punct::LParen) => {
                    self.bump()?;
                    let mut children = vec![expr];
                    loop {
                        if self.at_punct(Punct::RParen)? {
                            break;
                        }
                        if self.at_punct(Punct::Ellipsis)? {
                            let dots = self.bump()?;
                            let arg = self.parse_assignment()?;
                            let span = Span::new(dots.span.start, self.span_of(arg).end);
                            children.push(self.alloc(NodeKind::SpreadElement, span, vec![arg]));
                        } else {
                            children.push(self.parse_assignment()?);
                        }
                        if self.eat_punct(Punct::Comma)?.is_none() {
                            break;
                        }
                    }
                    let close = self.expect_punct(Punct::RParen)?;
                    let span = Span::new(self.span_of(expr).start, close.span.end);
                    expr = self.alloc(NodeKind::CallExpression, span, children);
                }
                TokenKind::Template => {
                    self.bump()?;
                    let template = self.parse_template_literal(tok)?;
                    let span = Span::new(self.span_of(expr).start, self.span_of(template).end);
                    expr = self.alloc(NodeKind::TaggedTemplate, span, vec![expr, template]);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Ident => {
                let word = self.text(tok);
                match word {
                    "true" | "false" | "null" | "undefined" => {
                        let lit = self.bump()?;
                        Ok(self.alloc(
                            NodeKind::Literal {
                                raw: self.text(lit).to_string(),
                            },
                            lit.span,
                            Vec::new(),
                        ))
                    }
                    "function" => self.parse_function(false),
                    "new" => {
                        let new_kw = self.bump()?;
                        let callee = self.parse_unary()?;
                        let span = Span::new(new_kw.span.start, self.span_of(callee).end);
                        Ok(self.alloc(NodeKind::NewExpression, span, vec![callee]))
                    }
                    _ => {
                        let ident = self.bump()?;
                        if self.at_punct(Punct::Arrow)? {
                            // Single-parameter arrow without parentheses.
                            let param = self.alloc(
                                NodeKind::Identifier {
                                    name: self.lexer.text(ident.span).to_string(),
                                },
                                ident.span,
                                Vec::new(),
                            );
                            self.bump()?;
                            let body = self.parse_arrow_body()?;
                            let span = Span::new(ident.span.start, self.span_of(body).end);
                            return Ok(self.alloc(
                                NodeKind::ArrowFunction { param_count: 1 },
                                span,
                                vec![param, body],
                            ));
                        }
                        Ok(self.alloc(
                            NodeKind::Identifier {
                                name: self.lexer.text(ident.span).to_string(),
                            },
                            ident.span,
                            Vec::new(),
                        ))
                    }
                }
            }
            TokenKind::Number | TokenKind::Str | TokenKind::Regex => {
                let lit = self.bump()?;
                Ok(self.alloc(
                    NodeKind::Literal {
                        raw: self.text(lit).to_string(),
                    },
                    lit.span,
                    Vec::new(),
                ))
            }
            TokenKind::Template => {
                let open = self.bump()?;
                self.parse_template_literal(open)
            }
            TokenKind::Punct(Punct::LParen) => {
                // Decide arrow vs. parenthesized expression by scanning
                // past the balanced parens for `=>`.
                let checkpoint = self.checkpoint();
                self.consume_balanced()?;
                let is_arrow = self.at_punct(Punct::Arrow)?;
                self.restore(checkpoint);
                if is_arrow {
                    self.parse_paren_arrow()
                } else {
                    let open = self.bump()?;
                    let inner = self.parse_assignment()?;
                    let close = self.expect_punct(Punct::RParen)?;
                    let span = Span::new(open.span.start, close.span.end);
                    Ok(self.alloc(NodeKind::Paren, span, vec![inner]))
                }
            }
            TokenKind::Punct(Punct::LBrace) => self.parse_object_expression(),
            TokenKind::Punct(Punct::LBracket) => self.parse_array_expression(),
            TokenKind::Punct(Punct::Lt) => {
                let lt = self.bump()?;
                self.parse_jsx_element_after_lt(lt)
            }
            _ => Err(Fail::Lost),
        }
    }

    fn parse_arrow_body(&mut self) -> PResult<NodeId> {
        if self.at_punct(Punct::LBrace)? {
            self.parse_block()
        } else {
            self.parse_assignment()
        }
    }

    fn parse_paren_arrow(&mut self) -> PResult<NodeId> {
        let open = self.bump()?;
        let start = open.span.start;
        let mut params = Vec::new();

        loop {
            if self.at_punct(Punct::RParen)? {
                break;
            }
            params.push(self.parse_arrow_param()?);
            if self.eat_punct(Punct::Comma)?.is_none() {
                break;
            }
        }
        self.expect_punct(Punct::RParen)?;
        self.expect_punct(Punct::Arrow)?;
        let body = self.parse_arrow_body()?;
        let span = Span::new(start, self.span_of(body).end);

        let param_count = params.len();
        let mut children = params;
        children.push(body);
        Ok(self.alloc(NodeKind::ArrowFunction { param_count }, span, children))
    }

    fn parse_arrow_param(&mut self) -> PResult<NodeId> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Ident => {
                let ident = self.bump()?;
                if self.at_punct(Punct::Eq)? {
                    // Parameter defaults stay outside the modeled subset.
                    return Err(Fail::Lost);
                }
                Ok(self.alloc(
                    NodeKind::Identifier {
                        name: self.lexer.text(ident.span).to_string(),
                    },
                    ident.span,
                    Vec::new(),
                ))
            }
            TokenKind::Punct(Punct::LBrace) => self.parse_object_pattern(),
            TokenKind::Punct(Punct::Ellipsis) => {
                let dots = self.bump()?;
                let local = self.expect_ident()?;
                Ok(self.alloc(
                    NodeKind::RestElement {
                        local: self.text(local).to_string(),
                    },
                    Span::new(dots.span.start, local.span.end),
                    Vec::new(),
                ))
            }
            _ => Err(Fail::Lost),
        }
    }

    fn parse_object_pattern(&mut self) -> PResult<NodeId> {
        let open = self.bump()?;
        let start = open.span.start;
        let mut properties = Vec::new();

        loop {
            if let Some(close) = self.eat_punct(Punct::RBrace)? {
                return Ok(self.alloc(
                    NodeKind::ObjectPattern,
                    Span::new(start, close.span.end),
                    properties,
                ));
            }
            if self.at_punct(Punct::Ellipsis)? {
                let dots = self.bump()?;
                let local = self.expect_ident()?;
                properties.push(self.alloc(
                    NodeKind::RestElement {
                        local: self.text(local).to_string(),
                    },
                    Span::new(dots.span.start, local.span.end),
                    Vec::new(),
                ));
            } else {
                let key = self.expect_ident()?;
                let mut local = key;
                if self.eat_punct(Punct::Colon)?.is_some() {
                    local = self.expect_ident()?;
                }
                if self.at_punct(Punct::Eq)? {
                    return Err(Fail::Lost);
                }
                properties.push(self.alloc(
                    NodeKind::PatternProperty {
                        key: self.text(key).to_string(),
                        local: self.text(local).to_string(),
                    },
                    Span::new(key.span.start, local.span.end),
                    Vec::new(),
                ));
            }
            if self.eat_punct(Punct::Comma)?.is_none() {
                let close = self.expect_punct(Punct::RBrace)?;
                return Ok(self.alloc(
                    NodeKind::ObjectPattern,
                    Span::new(start, close.span.end),
                    properties,
                ));
            }
        }
    }

    fn parse_object_expression(&mut self) -> PResult<NodeId> {
        let open = self.bump()?;
        let start = open.span.start;
        let mut properties = Vec::new();

        loop {
            if let Some(close) = self.eat_punct(Punct::RBrace)? {
                return Ok(self.alloc(
                    NodeKind::ObjectExpression,
                    Span::new(start, close.span.end),
                    properties,
                ));
            }

            if self.at_punct(Punct::Ellipsis)? {
                let dots = self.bump()?;
                let arg = self.parse_assignment()?;
                let span = Span::new(dots.span.start, self.span_of(arg).end);
                properties.push(self.alloc(NodeKind::SpreadElement, span, vec![arg]));
            } else if self.at_punct(Punct::LBracket)? {
                let open_key = self.bump()?;
                let key_expr = self.parse_assignment()?;
                self.expect_punct(Punct::RBracket)?;
                self.expect_punct(Punct::Colon)?;
                let value = self.parse_assignment()?;
                let span = Span::new(open_key.span.start, self.span_of(value).end);
                properties.push(self.alloc(
                    NodeKind::ObjectProperty {
                        key: String::new(),
                        computed: true,
                        shorthand: false,
                    },
                    span,
                    vec![key_expr, value],
                ));
            } else {
                let key = self.bump()?;
                let key_ok = matches!(key.kind, TokenKind::Ident | TokenKind::Str | TokenKind::Number);
                if !key_ok {
                    return Err(Fail::Lost);
                }
                let key_text = self.text(key).to_string();
                if self.eat_punct(Punct::Colon)?.is_some() {
                    let value = self.parse_assignment()?;
                    let span = Span::new(key.span.start, self.span_of(value).end);
                    properties.push(self.alloc(
                        NodeKind::ObjectProperty {
                            key: key_text,
                            computed: false,
                            shorthand: false,
                        },
                        span,
                        vec![value],
                    ));
                } else if self.at_punct(Punct::LParen)? {
                    // Method shorthand is outside the modeled subset.
                    return Err(Fail::Lost);
                } else {
                    if key.kind != TokenKind::Ident {
                        return Err(Fail::Lost);
                    }
                    properties.push(self.alloc(
                        NodeKind::ObjectProperty {
                            key: key_text,
                            computed: false,
                            shorthand: true,
                        },
                        key.span,
                        Vec::new(),
                    ));
                }
            }

            if self.eat_punct(Punct::Comma)?.is_none() {
                let close = self.expect_punct(Punct::RBrace)?;
                return Ok(self.alloc(
                    NodeKind::ObjectExpression,
                    Span::new(start, close.span.end),
                    properties,
                ));
            }
        }
    }

    fn parse_array_expression(&mut self) -> PResult<NodeId> {
        let open = self.bump()?;
        let start = open.span.start;
        let mut elements = Vec::new();

        loop {
            if let Some(close) = self.eat_punct(Punct::RBracket)? {
                return Ok(self.alloc(
                    NodeKind::ArrayExpression,
                    Span::new(start, close.span.end),
                    elements,
                ));
            }
            if self.at_punct(Punct::Ellipsis)? {
                let dots = self.bump()?;
                let arg = self.parse_assignment()?;
                let span = Span::new(dots.span.start, self.span_of(arg).end);
                elements.push(self.alloc(NodeKind::SpreadElement, span, vec![arg]));
            } else {
                elements.push(self.parse_assignment()?);
            }
            if self.eat_punct(Punct::Comma)?.is_none() {
                let close = self.expect_punct(Punct::RBracket)?;
                return Ok(self.alloc(
                    NodeKind::ArrayExpression,
                    Span::new(start, close.span.end),
                    elements,
                ));
            }
        }
    }

    /// Parse a template literal. The opening backtick token was already
    /// consumed; `open` is that token.
    fn parse_template_literal(&mut self, open: Token) -> PResult<NodeId> {
        debug_assert!(self.peeked.is_none());
        let start = open.span.start;
        let mut children = Vec::new();

        loop {
            let (chunk, delim) = self.lexer.template_chunk()?;
            if !chunk.is_empty() {
                children.push(self.alloc(NodeKind::TemplateChunk, chunk, Vec::new()));
            }
            match delim {
                TemplateDelim::End => {
                    let end = self.lexer.pos();
                    return Ok(self.alloc(
                        NodeKind::TemplateLiteral,
                        Span::new(start, end),
                        children,
                    ));
                }
                TemplateDelim::Interp => {
                    let expr = self.parse_assignment()?;
                    self.expect_punct(Punct::RBrace)?;
                    children.push(expr);
                }
            }
        }
    }

    // ===== JSX =====

    /// Parse a JSX element or fragment. The opening `<` was consumed.
    fn parse_jsx_element_after_lt(&mut self, lt: Token) -> PResult<NodeId> {
        let start = lt.span.start;
        let name = self.parse_jsx_name()?;
        let mut children = Vec::new();

        // Attributes, then `/>` or `>`.
        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Ident => children.push(self.parse_jsx_attribute()?),
                TokenKind::Punct(Punct::LBrace) => {
                    let open = self.bump()?;
                    self.expect_punct(Punct::Ellipsis)?;
                    let arg = self.parse_assignment()?;
                    let close = self.expect_punct(Punct::RBrace)?;
                    children.push(self.alloc(
                        NodeKind::JsxSpreadAttribute,
                        Span::new(open.span.start, close.span.end),
                        vec![arg],
                    ));
                }
                TokenKind::Punct(Punct::Slash) => {
                    self.bump()?;
                    let gt = self.expect_punct(Punct::Gt)?;
                    return Ok(self.alloc(
                        NodeKind::JsxElement { name },
                        Span::new(start, gt.span.end),
                        children,
                    ));
                }
                TokenKind::Punct(Punct::Gt) => {
                    self.bump()?;
                    break;
                }
                _ => return Err(Fail::Lost),
            }
        }

        // Children, then the closing tag.
        let end = loop {
            debug_assert!(self.peeked.is_none());
            let text_span = self.lexer.jsx_text();
            if !text_span.is_empty() {
                children.push(self.alloc(NodeKind::JsxText, text_span, Vec::new()));
            }
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Punct(Punct::Lt) => {
                    let inner_lt = self.bump()?;
                    if self.at_punct(Punct::Slash)? {
                        break self.skip_jsx_closing_tag()?;
                    }
                    children.push(self.parse_jsx_element_after_lt(inner_lt)?);
                }
                TokenKind::Punct(Punct::LBrace) => {
                    let open = self.bump()?;
                    let close = if self.at_punct(Punct::RBrace)? {
                        // Empty container (comments are trivia).
                        self.bump()?
                    } else {
                        let expr = self.parse_assignment()?;
                        let close = self.expect_punct(Punct::RBrace)?;
                        children.push(self.alloc(
                            NodeKind::JsxExpressionContainer,
                            Span::new(open.span.start, close.span.end),
                            vec![expr],
                        ));
                        continue;
                    };
                    children.push(self.alloc(
                        NodeKind::JsxExpressionContainer,
                        Span::new(open.span.start, close.span.end),
                        Vec::new(),
                    ));
                }
                TokenKind::Eof => {
                    return Err(self.fatal(tok.span.start, "unterminated JSX element"));
                }
                _ => return Err(Fail::Lost),
            }
        };

        Ok(self.alloc(
            NodeKind::JsxElement { name },
            Span::new(start, end),
            children,
        ))
    }

    /// Element name after `<`: possibly-dotted identifier, or empty for
    /// a fragment.
    fn parse_jsx_name(&mut self) -> PResult<String> {
        if self.at_punct(Punct::Gt)? || self.at_punct(Punct::Slash)? {
            return Ok(String::new());
        }
        let first = self.expect_ident()?;
        let mut name = self.text(first).to_string();
        while self.at_punct(Punct::Dot)? {
            self.bump()?;
            let part = self.expect_ident()?;
            name.push('.');
            name.push_str(self.text(part));
        }
        Ok(name)
    }

    fn parse_jsx_attribute(&mut self) -> PResult<NodeId> {
        let first = self.bump()?;
        let start = first.span.start;
        let mut name = self.text(first).to_string();
        let mut name_end = first.span.end;

        // Multi-part names like data-testid or xml:lang; the pieces must
        // be adjacent in the source.
        loop {
            let sep = self.peek()?;
            let joinable = matches!(sep.kind, TokenKind::Punct(Punct::Minus | Punct::Colon))
                && sep.span.start == name_end;
            if !joinable {
                break;
            }
            self.bump()?;
            let part = self.peek()?;
            if part.kind != TokenKind::Ident || part.span.start != sep.span.end {
                return Err(Fail::Lost);
            }
            self.bump()?;
            name.push_str(self.text(sep));
            name.push_str(self.text(part));
            name_end = part.span.end;
        }

        let mut children = Vec::new();
        let mut end = name_end;
        if self.eat_punct(Punct::Eq)?.is_some() {
            let value = self.peek()?;
            match value.kind {
                TokenKind::Str => {
                    let lit = self.bump()?;
                    end = lit.span.end;
                    children.push(self.alloc(
                        NodeKind::Literal {
                            raw: self.text(lit).to_string(),
                        },
                        lit.span,
                        Vec::new(),
                    ));
                }
                TokenKind::Punct(Punct::LBrace) => {
                    let open = self.bump()?;
                    let expr = self.parse_assignment()?;
                    let close = self.expect_punct(Punct::RBrace)?;
                    end = close.span.end;
                    children.push(self.alloc(
                        NodeKind::JsxExpressionContainer,
                        Span::new(open.span.start, close.span.end),
                        vec![expr],
                    ));
                }
                _ => return Err(Fail::Lost),
            }
        }

        Ok(self.alloc(
            NodeKind::JsxAttribute { name },
            Span::new(start, end),
            children,
        ))
    }

    /// Consume `</name>` (the `<` was consumed, `/` is next). Returns
    /// the byte offset just past `>`.
    fn skip_jsx_closing_tag(&mut self) -> PResult<usize> {
        loop {
            let tok = self.bump()?;
            match tok.kind {
                TokenKind::Punct(Punct::Gt) => return Ok(tok.span.end),
                TokenKind::Eof => {
                    return Err(self.fatal(tok.span.start, "unterminated JSX element"));
                }
                _ => {}
            }
        }
    }
}

fn unquote(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}
