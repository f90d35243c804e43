//! Declaration-level Go parser.

use super::lexer::{tokenize, Token, TokenKind};
use super::{ChanDir, GoFile, StructField, TypeExpr, TypeSpec};
use crate::error::{Error, Result};
use tracing::trace;

/// Parses a Go source file.
///
/// Fails on any syntax error the declaration-level grammar can detect; the
/// caller decides whether that is fatal.
pub fn parse_file(source: &str) -> Result<GoFile> {
    let tokens = tokenize(source)?;
    Parser { tokens, pos: 0 }.file()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error(&self, expected: &str) -> Error {
        let found = self.peek();
        let found = match found.kind {
            TokenKind::Eof => "EOF".to_string(),
            TokenKind::Semicolon if found.text == "\n" => "newline".to_string(),
            _ => format!("'{}'", found.text),
        };
        Error::go_syntax(self.peek().line, format!("expected {}, found {}", expected, found))
    }

    fn expect_op(&mut self, op: &str) -> Result<()> {
        if self.peek().is_op(op) {
            self.next();
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", op)))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.peek().is_keyword(keyword) {
            self.next();
            Ok(())
        } else {
            Err(self.error(keyword))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        if self.peek().kind == TokenKind::Ident {
            Ok(self.next().text)
        } else {
            Err(self.error("identifier"))
        }
    }

    /// Consumes a statement terminator. A semicolon may be omitted before a
    /// closing `)` or `}` and at the end of the file.
    fn expect_terminator(&mut self) -> Result<()> {
        let token = self.peek();
        if token.kind == TokenKind::Semicolon {
            self.next();
            Ok(())
        } else if token.kind == TokenKind::Eof || token.is_op(")") || token.is_op("}") {
            Ok(())
        } else {
            Err(self.error("';' or newline"))
        }
    }

    fn file(mut self) -> Result<GoFile> {
        self.expect_keyword("package")?;
        let package = self.expect_ident()?;
        self.expect_terminator()?;

        while self.peek().is_keyword("import") {
            self.next();
            self.group(Self::import_spec)?;
            self.expect_terminator()?;
        }

        let mut types = Vec::new();
        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Keyword if token.text == "type" => {
                    self.next();
                    let mut specs = Vec::new();
                    self.group(|p| {
                        specs.push(p.type_spec()?);
                        Ok(())
                    })?;
                    types.extend(specs);
                    self.expect_terminator()?;
                }
                TokenKind::Keyword if matches!(token.text.as_str(), "func" | "var" | "const") => {
                    trace!("Skipping {} declaration at line {}", token.text, token.line);
                    self.skip_declaration()?;
                }
                TokenKind::Keyword if token.text == "import" => {
                    return Err(Error::go_syntax(
                        token.line,
                        "imports must appear before other declarations",
                    ));
                }
                _ => return Err(self.error("declaration")),
            }
        }

        Ok(GoFile { package, types })
    }

    /// Parses either a single spec or a parenthesized group of specs
    fn group(&mut self, mut spec: impl FnMut(&mut Self) -> Result<()>) -> Result<()> {
        if !self.peek().is_op("(") {
            return spec(self);
        }
        self.next();
        while !self.peek().is_op(")") {
            if self.peek().kind == TokenKind::Eof {
                return Err(self.error("')'"));
            }
            spec(self)?;
            self.expect_terminator()?;
        }
        self.next();
        Ok(())
    }

    fn import_spec(&mut self) -> Result<()> {
        if self.peek().kind == TokenKind::Ident || self.peek().is_op(".") {
            self.next();
        }
        if self.peek().kind != TokenKind::String {
            return Err(self.error("import path"));
        }
        self.next();
        Ok(())
    }

    fn type_spec(&mut self) -> Result<TypeSpec> {
        let name = self.expect_ident()?;

        let generic = self.peek().is_op("[") && self.at_type_params();
        if generic {
            self.skip_group()?;
        }

        let alias = self.peek().is_op("=");
        if alias {
            self.next();
        }

        let ty = self.parse_type()?;
        Ok(TypeSpec {
            name,
            alias,
            generic,
            ty,
        })
    }

    /// Distinguishes `type T[P any] ...` from `type T [N]E`.
    ///
    /// A single `P *C` parameter is indistinguishable from the length
    /// expression `P * C` and reads as an array, as Go itself does; a
    /// top-level comma always means type parameters.
    fn at_type_params(&self) -> bool {
        if self.peek_at(1).kind != TokenKind::Ident {
            return false;
        }
        let second = self.peek_at(2);
        matches!(second.kind, TokenKind::Ident | TokenKind::Keyword)
            || second.is_op("~")
            || (second.is_op("[") && self.peek_at(3).is_op("]"))
            || self.bracket_has_comma()
    }

    /// Whether the bracket group opened by the current `[` holds a comma
    /// outside any nested brackets
    fn bracket_has_comma(&self) -> bool {
        let mut depth = 0usize;
        for token in &self.tokens[self.pos + 1..] {
            match token.kind {
                TokenKind::Eof => return false,
                TokenKind::Operator => match token.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            return false;
                        }
                        depth -= 1;
                    }
                    "," if depth == 0 => return true,
                    _ => {}
                },
                _ => {}
            }
        }
        false
    }

    /// Skips a `func`, `var` or `const` declaration up to its terminator
    fn skip_declaration(&mut self) -> Result<()> {
        self.next();
        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Semicolon => {
                    self.next();
                    return Ok(());
                }
                TokenKind::Operator if matches!(token.text.as_str(), "(" | "[" | "{") => {
                    self.skip_group()?;
                }
                TokenKind::Operator if matches!(token.text.as_str(), ")" | "]" | "}") => {
                    return Err(self.error("declaration"));
                }
                _ => {
                    self.next();
                }
            }
        }
    }

    /// Consumes a bracketed group starting at the current opener and returns
    /// the tokens between the outer brackets.
    fn skip_group(&mut self) -> Result<Vec<Token>> {
        let open = self.next();
        let mut stack = vec![closer(&open.text)];
        let mut inner = Vec::new();

        while let Some(&expected) = stack.last() {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Eof => {
                    return Err(Error::go_syntax(
                        open.line,
                        format!("'{}' is never closed", open.text),
                    ))
                }
                TokenKind::Operator if matches!(token.text.as_str(), "(" | "[" | "{") => {
                    stack.push(closer(&token.text));
                }
                TokenKind::Operator if matches!(token.text.as_str(), ")" | "]" | "}") => {
                    if token.text != expected {
                        return Err(self.error(&format!("'{}'", expected)));
                    }
                    stack.pop();
                }
                _ => {}
            }
            self.next();
            if !stack.is_empty() {
                inner.push(token);
            }
        }

        Ok(inner)
    }

    fn starts_type(token: &Token) -> bool {
        match token.kind {
            TokenKind::Ident => true,
            TokenKind::Keyword => matches!(
                token.text.as_str(),
                "map" | "chan" | "func" | "struct" | "interface"
            ),
            TokenKind::Operator => matches!(token.text.as_str(), "*" | "[" | "(" | "<-"),
            _ => false,
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident => self.type_name(),
            TokenKind::Operator => match token.text.as_str() {
                "*" => {
                    self.next();
                    Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
                }
                "[" => self.array_or_slice(),
                "(" => {
                    self.next();
                    let inner = self.parse_type()?;
                    self.expect_op(")")?;
                    Ok(TypeExpr::Paren(Box::new(inner)))
                }
                "<-" => {
                    self.next();
                    self.expect_keyword("chan")?;
                    let elem = self.parse_type()?;
                    Ok(TypeExpr::Chan {
                        dir: ChanDir::Recv,
                        elem: Box::new(elem),
                    })
                }
                _ => Err(self.error("type")),
            },
            TokenKind::Keyword => match token.text.as_str() {
                "map" => {
                    self.next();
                    self.expect_op("[")?;
                    let key = self.parse_type()?;
                    self.expect_op("]")?;
                    let value = self.parse_type()?;
                    Ok(TypeExpr::Map {
                        key: Box::new(key),
                        value: Box::new(value),
                    })
                }
                "chan" => {
                    self.next();
                    let dir = if self.peek().is_op("<-") {
                        self.next();
                        ChanDir::Send
                    } else {
                        ChanDir::Both
                    };
                    let elem = self.parse_type()?;
                    Ok(TypeExpr::Chan {
                        dir,
                        elem: Box::new(elem),
                    })
                }
                "func" => {
                    self.next();
                    self.signature()?;
                    Ok(TypeExpr::Func)
                }
                "struct" => self.struct_type(),
                "interface" => {
                    self.next();
                    if !self.peek().is_op("{") {
                        return Err(self.error("'{'"));
                    }
                    self.skip_group()?;
                    Ok(TypeExpr::Interface)
                }
                _ => Err(self.error("type")),
            },
            _ => Err(self.error("type")),
        }
    }

    fn type_name(&mut self) -> Result<TypeExpr> {
        let first = self.expect_ident()?;
        let base = if self.peek().is_op(".") {
            self.next();
            TypeExpr::Qualified {
                package: first,
                name: self.expect_ident()?,
            }
        } else {
            TypeExpr::Ident(first)
        };

        if !self.peek().is_op("[") {
            return Ok(base);
        }

        self.next();
        let mut args = vec![self.parse_type()?];
        while self.peek().is_op(",") {
            self.next();
            if self.peek().is_op("]") {
                break;
            }
            args.push(self.parse_type()?);
        }
        self.expect_op("]")?;
        Ok(TypeExpr::Generic {
            base: Box::new(base),
            args,
        })
    }

    fn array_or_slice(&mut self) -> Result<TypeExpr> {
        if self.peek_at(1).is_op("]") {
            self.next();
            self.next();
            return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
        }

        let len_tokens = self.skip_group()?;
        if len_tokens.is_empty() {
            return Err(self.error("array length"));
        }
        let len = len_tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join("");
        let elem = self.parse_type()?;
        Ok(TypeExpr::Array {
            len,
            elem: Box::new(elem),
        })
    }

    fn signature(&mut self) -> Result<()> {
        if !self.peek().is_op("(") {
            return Err(self.error("'('"));
        }
        self.skip_group()?;

        if self.peek().is_op("(") {
            self.skip_group()?;
        } else if Self::starts_type(self.peek()) {
            self.parse_type()?;
        }
        Ok(())
    }

    fn struct_type(&mut self) -> Result<TypeExpr> {
        self.expect_keyword("struct")?;
        self.expect_op("{")?;

        let mut fields = Vec::new();
        while !self.peek().is_op("}") {
            fields.push(self.field_decl()?);
            self.expect_terminator()?;
        }
        self.next();

        Ok(TypeExpr::Struct(fields))
    }

    /// Whether `Ident [` in a struct body is an embedded instantiation such
    /// as `List[int]` rather than a field with an array or slice type
    fn at_embedded_instance(&mut self) -> bool {
        let start = self.pos;
        let embedded = self.type_name().is_ok() && {
            let next = self.peek();
            next.is_op("}") || matches!(next.kind, TokenKind::Semicolon | TokenKind::String)
        };
        self.pos = start;
        embedded
    }

    fn field_decl(&mut self) -> Result<StructField> {
        let token = self.peek().clone();
        let names = if token.is_op("*") {
            Vec::new()
        } else if token.kind == TokenKind::Ident {
            let following = self.peek_at(1).clone();
            let embedded = following.is_op(".")
                || following.is_op("}")
                || matches!(following.kind, TokenKind::Semicolon | TokenKind::String)
                || (following.is_op("[") && self.at_embedded_instance());
            if embedded {
                Vec::new()
            } else {
                let mut names = vec![self.expect_ident()?];
                while self.peek().is_op(",") {
                    self.next();
                    names.push(self.expect_ident()?);
                }
                names
            }
        } else {
            return Err(self.error("field name or embedded type"));
        };

        let ty = self.parse_type()?;

        let tag = if self.peek().kind == TokenKind::String {
            Some(self.next().text)
        } else {
            None
        };

        Ok(StructField { names, ty, tag })
    }
}

fn closer(open: &str) -> &'static str {
    match open {
        "(" => ")",
        "[" => "]",
        _ => "}",
    }
}
