//! Pull-based lexer for the JS/JSX subset the parser consumes.
//!
//! The lexer is parser-driven: ordinary tokens come from [`Lexer::next_token`],
//! while raw regions (template literal chunks, JSX text) are scanned on demand
//! by the parser through [`Lexer::template_chunk`] and [`Lexer::jsx_text`].
//! This keeps template and JSX lexing out of the token stream entirely, the
//! way a hand-written expression lexer stays single-purpose.
//!
//! Checkpoint/restore is a byte position plus the one-token context used for
//! the regex-vs-division decision, so the parser can speculate cheaply
//! (arrow-function lookahead, statement fallback).

use restyle_core::{text, Span};

use crate::parser::ParseError;

/// Token categories produced by [`Lexer::next_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword; the parser inspects the text.
    Ident,
    /// Numeric literal.
    Number,
    /// String literal, quotes included.
    Str,
    /// Regular expression literal, delimiters and flags included.
    Regex,
    /// The opening backtick of a template literal. Chunks follow via
    /// [`Lexer::template_chunk`].
    Template,
    /// Punctuation or operator.
    Punct(Punct),
    /// End of input.
    Eof,
}

/// Punctuation the parser dispatches on. Everything else is `Other`,
/// which ends the current expression and lets the statement fall back
/// to an opaque node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Ellipsis,
    Colon,
    Question,
    Arrow,
    Eq,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
    Tilde,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    QuestionQuestion,
    Caret,
    Other,
}

/// A lexed token: kind plus the byte span it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// What terminated a template chunk scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateDelim {
    /// Closing backtick; the template literal is complete.
    End,
    /// `${` — an interpolated expression follows.
    Interp,
}

/// Whether the previous significant token can end an operand.
/// Decides regex-literal vs. division when a `/` is seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    None,
    Operand,
    Operator,
}

/// Saved lexer state for speculative parsing.
#[derive(Debug, Clone, Copy)]
pub struct LexState {
    pos: usize,
    prev: Prev,
}

pub struct Lexer<'s> {
    src: &'s str,
    bytes: &'s [u8],
    pos: usize,
    prev: Prev,
}

// Identifier-like tokens after which a `/` still starts a regex literal.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "case",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "instanceof",
    "do",
    "else",
];

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            prev: Prev::None,
        }
    }

    /// Current byte position (start of the next unscanned content).
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Source text for a span.
    pub fn text(&self, span: Span) -> &'s str {
        &self.src[span.start..span.end]
    }

    /// Save the lexer state for later [`Lexer::restore`].
    pub fn state(&self) -> LexState {
        LexState {
            pos: self.pos,
            prev: self.prev,
        }
    }

    /// Rewind to a previously saved state.
    pub fn restore(&mut self, state: LexState) {
        self.pos = state.pos;
        self.prev = state.prev;
    }

    fn error(&self, at: usize, message: impl Into<String>) -> ParseError {
        ParseError {
            line: text::line_of_offset(self.src, at),
            message: message.into(),
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// Skip whitespace and comments. Errors on an unterminated block comment.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek_byte() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.pos += 1;
                }
                Some(b'/') if self.byte_at(self.pos + 1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.byte_at(self.pos + 1) == Some(b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match self.peek_byte() {
                            Some(b'*') if self.byte_at(self.pos + 1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.pos += 1,
                            None => return Err(self.error(start, "unterminated block comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Lex the next ordinary token.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia()?;
        let start = self.pos;

        let Some(b) = self.peek_byte() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::empty(start),
            });
        };

        if is_ident_start(b) {
            while let Some(c) = self.peek_byte() {
                if is_ident_continue(c) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let span = Span::new(start, self.pos);
            let word = self.text(span);
            self.prev = if REGEX_PRECEDING_KEYWORDS.contains(&word) {
                Prev::Operator
            } else {
                Prev::Operand
            };
            return Ok(Token {
                kind: TokenKind::Ident,
                span,
            });
        }

        if b.is_ascii_digit() || (b == b'.' && self.byte_at(self.pos + 1).is_some_and(|c| c.is_ascii_digit())) {
            return Ok(self.scan_number(start));
        }

        if b == b'"' || b == b'\'' {
            return self.scan_string(start, b);
        }

        if b == b'`' {
            self.pos += 1;
            self.prev = Prev::Operator;
            return Ok(Token {
                kind: TokenKind::Template,
                span: Span::new(start, self.pos),
            });
        }

        if b == b'/' && self.prev != Prev::Operand {
            return self.scan_regex(start);
        }

        self.scan_punct(start)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        // Permissive scan: digits, hex/exponent letters, separators, dots.
        while let Some(c) = self.peek_byte() {
            let prev = self.byte_at(self.pos.wrapping_sub(1));
            let exponent_sign = (c == b'+' || c == b'-')
                && matches!(prev, Some(b'e') | Some(b'E'));
            if c.is_ascii_alphanumeric() || c == b'.' || c == b'_' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.prev = Prev::Operand;
        Token {
            kind: TokenKind::Number,
            span: Span::new(start, self.pos),
        }
    }

    fn scan_string(&mut self, start: usize, quote: u8) -> Result<Token, ParseError> {
        self.pos += 1;
        loop {
            match self.peek_byte() {
                Some(b'\\') => {
                    self.pos += 2.min(self.bytes.len() - self.pos);
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\n') | None => {
                    return Err(self.error(start, "unterminated string literal"));
                }
                Some(_) => self.pos += 1,
            }
        }
        self.prev = Prev::Operand;
        Ok(Token {
            kind: TokenKind::Str,
            span: Span::new(start, self.pos),
        })
    }

    fn scan_regex(&mut self, start: usize) -> Result<Token, ParseError> {
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek_byte() {
                Some(b'\\') => {
                    self.pos += 2.min(self.bytes.len() - self.pos);
                }
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') if in_class => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(b'\n') | None => {
                    return Err(self.error(start, "unterminated regular expression"));
                }
                Some(_) => self.pos += 1,
            }
        }
        // Flags.
        while let Some(c) = self.peek_byte() {
            if c.is_ascii_alphabetic() {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.prev = Prev::Operand;
        Ok(Token {
            kind: TokenKind::Regex,
            span: Span::new(start, self.pos),
        })
    }

    fn scan_punct(&mut self, start: usize) -> Result<Token, ParseError> {
        // Maximal munch over the operator table.
        const TABLE: &[(&str, Punct)] = &[
            (">>>=", Punct::Other),
            ("...", Punct::Ellipsis),
            ("===", Punct::EqEqEq),
            ("!==", Punct::NotEqEq),
            ("**=", Punct::Other),
            ("<<=", Punct::Other),
            (">>=", Punct::Other),
            (">>>", Punct::Other),
            ("=>", Punct::Arrow),
            ("==", Punct::EqEq),
            ("!=", Punct::NotEq),
            ("<=", Punct::LtEq),
            (">=", Punct::GtEq),
            ("&&", Punct::AmpAmp),
            ("||", Punct::PipePipe),
            ("??", Punct::QuestionQuestion),
            ("?.", Punct::Other),
            ("++", Punct::Other),
            ("--", Punct::Other),
            ("**", Punct::Other),
            ("+=", Punct::Other),
            ("-=", Punct::Other),
            ("*=", Punct::Other),
            ("/=", Punct::Other),
            ("%=", Punct::Other),
            ("&=", Punct::Other),
            ("|=", Punct::Other),
            ("^=", Punct::Other),
            ("<<", Punct::Other),
            (">>", Punct::Other),
            ("(", Punct::LParen),
            (")", Punct::RParen),
            ("{", Punct::LBrace),
            ("}", Punct::RBrace),
            ("[", Punct::LBracket),
            ("]", Punct::RBracket),
            (";", Punct::Semi),
            (",", Punct::Comma),
            (".", Punct::Dot),
            (":", Punct::Colon),
            ("?", Punct::Question),
            ("=", Punct::Eq),
            ("<", Punct::Lt),
            (">", Punct::Gt),
            ("+", Punct::Plus),
            ("-", Punct::Minus),
            ("*", Punct::Star),
            ("/", Punct::Slash),
            ("%", Punct::Percent),
            ("!", Punct::Not),
            ("~", Punct::Tilde),
            ("&", Punct::Amp),
            ("|", Punct::Pipe),
            ("^", Punct::Caret),
        ];

        let rest = &self.src[self.pos..];
        for (pat, punct) in TABLE {
            if rest.starts_with(pat) {
                self.pos += pat.len();
                self.prev = match punct {
                    Punct::RParen | Punct::RBracket => Prev::Operand,
                    _ => Prev::Operator,
                };
                return Ok(Token {
                    kind: TokenKind::Punct(*punct),
                    span: Span::new(start, self.pos),
                });
            }
        }

        // Unknown byte (non-ASCII punctuation, stray control char).
        self.pos += 1;
        self.prev = Prev::Operator;
        Ok(Token {
            kind: TokenKind::Punct(Punct::Other),
            span: Span::new(start, self.pos),
        })
    }

    /// Scan a raw template chunk from the current position.
    ///
    /// Returns the span of the raw text (escapes left verbatim) and the
    /// delimiter that ended it; the delimiter itself is consumed.
    pub fn template_chunk(&mut self) -> Result<(Span, TemplateDelim), ParseError> {
        let start = self.pos;
        loop {
            match self.peek_byte() {
                Some(b'\\') => {
                    self.pos += 2.min(self.bytes.len() - self.pos);
                }
                Some(b'`') => {
                    let span = Span::new(start, self.pos);
                    self.pos += 1;
                    self.prev = Prev::Operand;
                    return Ok((span, TemplateDelim::End));
                }
                Some(b'$') if self.byte_at(self.pos + 1) == Some(b'{') => {
                    let span = Span::new(start, self.pos);
                    self.pos += 2;
                    self.prev = Prev::Operator;
                    return Ok((span, TemplateDelim::Interp));
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error(start, "unterminated template literal")),
            }
        }
    }

    /// Scan raw JSX text from the current position, stopping before `<`,
    /// `{`, or end of input. The span may be empty.
    pub fn jsx_text(&mut self) -> Span {
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b == b'<' || b == b'{' {
                break;
            }
            self.pos += 1;
        }
        Span::new(start, self.pos)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex failure");
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    mod basic_tokens {
        use super::*;

        #[test]
        fn identifiers_and_punctuation() {
            assert_eq!(
                kinds("styled.div"),
                vec![
                    TokenKind::Ident,
                    TokenKind::Punct(Punct::Dot),
                    TokenKind::Ident
                ]
            );
        }

        #[test]
        fn arrow_is_one_token() {
            assert_eq!(
                kinds("x => y"),
                vec![
                    TokenKind::Ident,
                    TokenKind::Punct(Punct::Arrow),
                    TokenKind::Ident
                ]
            );
        }

        #[test]
        fn string_spans_include_quotes() {
            let mut lexer = Lexer::new(r#""react-emotion""#);
            let tok = lexer.next_token().unwrap();
            assert_eq!(tok.kind, TokenKind::Str);
            assert_eq!(lexer.text(tok.span), r#""react-emotion""#);
        }

        #[test]
        fn comments_are_trivia() {
            assert_eq!(
                kinds("a // line\n/* block */ b"),
                vec![TokenKind::Ident, TokenKind::Ident]
            );
        }

        #[test]
        fn unterminated_string_is_an_error() {
            let mut lexer = Lexer::new("\"oops\nnext");
            assert!(lexer.next_token().is_err());
        }
    }

    mod regex_heuristic {
        use super::*;

        #[test]
        fn regex_after_operator() {
            assert_eq!(
                kinds("x = /a;b/g"),
                vec![
                    TokenKind::Ident,
                    TokenKind::Punct(Punct::Eq),
                    TokenKind::Regex
                ]
            );
        }

        #[test]
        fn division_after_operand() {
            assert_eq!(
                kinds("a / b"),
                vec![
                    TokenKind::Ident,
                    TokenKind::Punct(Punct::Slash),
                    TokenKind::Ident
                ]
            );
        }

        #[test]
        fn regex_after_return_keyword() {
            assert_eq!(kinds("return /x/"), vec![TokenKind::Ident, TokenKind::Regex]);
        }
    }

    mod template_chunks {
        use super::*;

        #[test]
        fn chunk_then_interpolation() {
            let src = "`color: ${c};`";
            let mut lexer = Lexer::new(src);
            let tok = lexer.next_token().unwrap();
            assert_eq!(tok.kind, TokenKind::Template);

            let (chunk, delim) = lexer.template_chunk().unwrap();
            assert_eq!(lexer.text(chunk), "color: ");
            assert_eq!(delim, TemplateDelim::Interp);

            let ident = lexer.next_token().unwrap();
            assert_eq!(ident.kind, TokenKind::Ident);
            let close = lexer.next_token().unwrap();
            assert_eq!(close.kind, TokenKind::Punct(Punct::RBrace));

            let (tail, delim) = lexer.template_chunk().unwrap();
            assert_eq!(lexer.text(tail), ";");
            assert_eq!(delim, TemplateDelim::End);
        }

        #[test]
        fn unterminated_template_is_fatal() {
            let mut lexer = Lexer::new("`open");
            lexer.next_token().unwrap();
            assert!(lexer.template_chunk().is_err());
        }
    }

    mod jsx_text {
        use super::*;

        #[test]
        fn stops_before_tag_and_brace() {
            let mut lexer = Lexer::new("hello <b>{x}");
            let span = lexer.jsx_text();
            assert_eq!(lexer.text(span), "hello ");
        }
    }

    mod checkpointing {
        use super::*;

        #[test]
        fn restore_rewinds() {
            let mut lexer = Lexer::new("a b c");
            let state = lexer.state();
            lexer.next_token().unwrap();
            lexer.next_token().unwrap();
            lexer.restore(state);
            let tok = lexer.next_token().unwrap();
            assert_eq!(lexer.text(tok.span), "a");
        }
    }
}
