//! Go tokenizer.
//!
//! Produces the token stream the declaration parser consumes, including the
//! semicolons Go inserts automatically at line ends:
//!
//! - after an identifier or a basic literal
//! - after the keywords `break`, `continue`, `fallthrough` and `return`
//! - after the operators `++`, `--`, `)`, `]` and `}`
//!
//! A block comment spanning lines counts as a newline; any other comment is
//! dropped.

use crate::error::{Error, Result};

/// Go keywords
const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Multi-character operators, longest first
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^",
];

/// Single-character operators and punctuation (`;` is handled separately)
const PUNCTUATION: &str = "+-*/%&|^<>=!()[]{},.:~";

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    Keyword,
    Int,
    Float,
    Imag,
    Char,
    String,
    Operator,
    Semicolon,
    Eof,
}

/// A token with its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    /// Source text; string literals keep their delimiters. Inserted
    /// semicolons have the text `"\n"`.
    pub(crate) text: String,
    /// 1-based line
    pub(crate) line: usize,
}

impl Token {
    pub(crate) fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    /// Whether a newline after this token terminates the statement
    fn ends_line(&self) -> bool {
        match self.kind {
            TokenKind::Ident
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::Imag
            | TokenKind::Char
            | TokenKind::String => true,
            TokenKind::Keyword => matches!(
                self.text.as_str(),
                "break" | "continue" | "fallthrough" | "return"
            ),
            TokenKind::Operator => matches!(self.text.as_str(), "++" | "--" | ")" | "]" | "}"),
            TokenKind::Semicolon | TokenKind::Eof => false,
        }
    }
}

/// Tokenizes a complete Go source file.
///
/// The returned stream always ends with a single [`TokenKind::Eof`] token.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize) {
        self.tokens.push(Token {
            kind,
            text: self.src[start..self.pos].to_string(),
            line,
        });
    }

    /// Inserts a semicolon if the previous token ends a line
    fn newline(&mut self) {
        if self.tokens.last().map_or(false, Token::ends_line) {
            self.tokens.push(Token {
                kind: TokenKind::Semicolon,
                text: "\n".to_string(),
                line: self.line,
            });
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.newline();
                    self.bump();
                }
                ' ' | '\t' | '\r' | '\u{feff}' => {
                    self.bump();
                }
                '/' if self.peek_nth(1) == Some('/') => self.line_comment(),
                '/' if self.peek_nth(1) == Some('*') => self.block_comment()?,
                '"' => self.interpreted_string()?,
                '`' => self.raw_string()?,
                '\'' => self.rune()?,
                ';' => {
                    let (start, line) = (self.pos, self.line);
                    self.bump();
                    self.push(TokenKind::Semicolon, start, line);
                }
                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek_nth(1).map_or(false, |d| d.is_ascii_digit()) => self.number(),
                c if c == '_' || c.is_alphabetic() => self.identifier(),
                _ => self.operator()?,
            }
        }

        self.newline();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            line: self.line,
        });
        Ok(self.tokens)
    }

    fn line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn block_comment(&mut self) -> Result<()> {
        let line = self.line;
        self.pos += 2;
        let mut spans_lines = false;
        loop {
            if self.rest().starts_with("*/") {
                self.pos += 2;
                break;
            }
            match self.bump() {
                Some('\n') => spans_lines = true,
                Some(_) => {}
                None => return Err(Error::go_syntax(line, "comment not terminated")),
            }
        }
        if spans_lines {
            self.newline();
        }
        Ok(())
    }

    fn interpreted_string(&mut self) -> Result<()> {
        let (start, line) = (self.pos, self.line);
        self.bump();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(Error::go_syntax(line, "string literal not terminated"));
                    }
                }
                Some('\n') | None => {
                    return Err(Error::go_syntax(line, "string literal not terminated"))
                }
                Some(_) => {}
            }
        }
        self.push(TokenKind::String, start, line);
        Ok(())
    }

    fn raw_string(&mut self) -> Result<()> {
        let (start, line) = (self.pos, self.line);
        self.bump();
        loop {
            match self.bump() {
                Some('`') => break,
                Some(_) => {}
                None => return Err(Error::go_syntax(line, "raw string literal not terminated")),
            }
        }
        self.push(TokenKind::String, start, line);
        Ok(())
    }

    fn rune(&mut self) -> Result<()> {
        let (start, line) = (self.pos, self.line);
        self.bump();
        let mut count = 0;
        loop {
            match self.bump() {
                Some('\'') => break,
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(Error::go_syntax(line, "rune literal not terminated"));
                    }
                }
                Some('\n') | None => {
                    return Err(Error::go_syntax(line, "rune literal not terminated"))
                }
                Some(_) => {}
            }
            count += 1;
        }
        if count == 0 {
            return Err(Error::go_syntax(line, "empty rune literal"));
        }
        self.push(TokenKind::Char, start, line);
        Ok(())
    }

    fn number(&mut self) {
        let (start, line) = (self.pos, self.line);
        let hex = self.rest().starts_with("0x") || self.rest().starts_with("0X");
        let mut prev = '\0';
        let mut kind = TokenKind::Int;

        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && (matches!(prev, 'p' | 'P') || (!hex && matches!(prev, 'e' | 'E')));
            if c == '.' {
                if self.peek_nth(1) == Some('.') {
                    break;
                }
                kind = TokenKind::Float;
            } else if !(c.is_ascii_alphanumeric() || c == '_' || exponent_sign) {
                break;
            }
            if exponent_sign || (!hex && matches!(c, 'e' | 'E')) || matches!(c, 'p' | 'P') {
                kind = TokenKind::Float;
            }
            prev = c;
            self.bump();
        }

        if prev == 'i' {
            kind = TokenKind::Imag;
        }
        self.push(kind, start, line);
    }

    fn identifier(&mut self) {
        let (start, line) = (self.pos, self.line);
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphanumeric() {
                self.bump();
            } else {
                break;
            }
        }
        let kind = if KEYWORDS.contains(&&self.src[start..self.pos]) {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        };
        self.push(kind, start, line);
    }

    fn operator(&mut self) -> Result<()> {
        let (start, line) = (self.pos, self.line);
        if let Some(op) = OPERATORS.iter().find(|op| self.rest().starts_with(**op)) {
            self.pos += op.len();
        } else {
            match self.peek() {
                Some(c) if PUNCTUATION.contains(c) => {
                    self.bump();
                }
                Some(c) => {
                    return Err(Error::go_syntax(
                        line,
                        format!("invalid character {:?}", c),
                    ))
                }
                None => return Ok(()),
            }
        }
        self.push(TokenKind::Operator, start, line);
        Ok(())
    }
}
