//! Tokenizer for Groovy build scripts.
//!
//! Comments are dropped; line breaks are kept as [`TokenKind::Newline`]
//! because they terminate Groovy command expressions.

use crate::ast::{Quote, Span, StrLit, StrPart};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(StrLit),
    Number(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    /// `.`, `?.`, `*.` and `.&`
    Dot,
    Assign,
    Arrow,
    Semi,
    Newline,
    Op(String),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Failure at a byte offset, before it is mapped to a line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "<=>", "==~", "**=", "<<=", ">>=", "...", "==", "!=", "<=", ">=", "&&", "||", "<<", ">>", "+=",
    "-=", "*=", "/=", "%=", "++", "--", "=~", "?:", "::", "**", "..",
];

pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, self.pos),
        });
    }

    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        if self.src.starts_with("#!") {
            self.pos = self.src.find('\n').unwrap_or(self.src.len());
        }

        while let Some(c) = self.peek_char() {
            let start = self.pos;
            match c {
                '\n' => {
                    self.pos += 1;
                    if !matches!(
                        self.tokens.last().map(|t| &t.kind),
                        Some(TokenKind::Newline) | None
                    ) {
                        self.push(TokenKind::Newline, start);
                    }
                }
                '\\' if self.rest()[1..].starts_with('\n') => {
                    // Explicit line continuation.
                    self.pos += 2;
                }
                c if c.is_whitespace() => self.pos += c.len_utf8(),
                '/' if self.rest().starts_with("//") => {
                    self.pos = self.rest().find('\n').map_or(self.src.len(), |i| self.pos + i);
                }
                '/' if self.rest().starts_with("/*") => {
                    let end = self.rest()[2..]
                        .find("*/")
                        .ok_or_else(|| SyntaxError::new(start, "unterminated comment"))?;
                    self.pos += end + 4;
                }
                '/' if self.expects_operand() => {
                    let lit = self.quoted(Quote::Slashy)?;
                    self.push(TokenKind::Str(lit), start);
                }
                '\'' | '"' => {
                    let lit = self.string(c)?;
                    self.push(TokenKind::Str(lit), start);
                }
                c if c.is_ascii_digit() => {
                    self.number();
                    let text = self.src[start..self.pos].to_string();
                    self.push(TokenKind::Number(text), start);
                }
                c if is_ident_start(c) => {
                    while let Some(c) = self.peek_char() {
                        if !is_ident_part(c) {
                            break;
                        }
                        self.pos += c.len_utf8();
                    }
                    let name = self.src[start..self.pos].to_string();
                    self.push(TokenKind::Ident(name), start);
                }
                _ => {
                    let kind = self.punctuation();
                    self.push(kind, start);
                }
            }
        }

        let end = self.src.len();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(end, end),
        });
        Ok(self.tokens)
    }

    fn number(&mut self) {
        let bytes = self.src.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            let fraction = b == b'.'
                && bytes
                    .get(self.pos + 1)
                    .is_some_and(|next| next.is_ascii_digit());
            if b.is_ascii_digit() || b == b'_' || fraction {
                self.pos += 1;
            } else {
                break;
            }
        }
        // Type suffixes and exponents: 10L, 1.5G, 1e10
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_alphanumeric() {
            self.pos += 1;
        }
    }

    fn punctuation(&mut self) -> TokenKind {
        let rest = self.rest();
        for special in ["?.", "*.", ".&"] {
            if rest.starts_with(special) {
                self.pos += special.len();
                return TokenKind::Dot;
            }
        }
        if rest.starts_with("->") {
            self.pos += 2;
            return TokenKind::Arrow;
        }
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            self.pos += op.len();
            return TokenKind::Op((*op).to_string());
        }

        let c = rest.chars().next().unwrap_or('\0');
        self.pos += c.len_utf8();
        match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '=' => TokenKind::Assign,
            ';' => TokenKind::Semi,
            other => TokenKind::Op(other.to_string()),
        }
    }

    /// A `/` starts a slashy string only where an operand is expected;
    /// elsewhere it divides.
    fn expects_operand(&self) -> bool {
        matches!(
            self.tokens.last().map(|t| &t.kind),
            None | Some(
                TokenKind::Newline
                    | TokenKind::Op(_)
                    | TokenKind::LParen
                    | TokenKind::LBracket
                    | TokenKind::LBrace
                    | TokenKind::Comma
                    | TokenKind::Assign
                    | TokenKind::Colon
                    | TokenKind::Arrow
                    | TokenKind::Semi
            )
        )
    }

    fn string(&mut self, quote_char: char) -> Result<StrLit, SyntaxError> {
        let triple: String = std::iter::repeat_n(quote_char, 3).collect();
        let quote = match (quote_char, self.rest().starts_with(&triple)) {
            ('\'', true) => Quote::TripleSingle,
            ('\'', false) => Quote::Single,
            (_, true) => Quote::TripleDouble,
            (_, false) => Quote::Double,
        };
        self.quoted(quote)
    }

    fn quoted(&mut self, quote: Quote) -> Result<StrLit, SyntaxError> {
        let start = self.pos;
        let delimiter = quote.delimiter();
        let slashy = quote == Quote::Slashy;
        let interpolates = matches!(quote, Quote::Double | Quote::TripleDouble | Quote::Slashy);
        let multiline = matches!(
            quote,
            Quote::TripleSingle | Quote::TripleDouble | Quote::Slashy
        );
        self.pos += delimiter.len();

        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            let Some(c) = self.peek_char() else {
                return Err(SyntaxError::new(start, "unterminated string literal"));
            };
            if self.rest().starts_with(delimiter) {
                self.pos += delimiter.len();
                break;
            }
            match c {
                '\n' if !multiline => {
                    return Err(SyntaxError::new(start, "unterminated string literal"));
                }
                '\\' if slashy => {
                    // Only the delimiter is escaped; other backslashes are regex syntax.
                    if self.rest()[1..].starts_with('/') {
                        self.pos += 2;
                        text.push('/');
                    } else {
                        self.pos += 1;
                        text.push('\\');
                    }
                }
                '\\' => {
                    self.pos += 1;
                    let Some(escaped) = self.peek_char() else {
                        return Err(SyntaxError::new(start, "unterminated string literal"));
                    };
                    self.pos += escaped.len_utf8();
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                '$' if interpolates => {
                    self.pos += 1;
                    if let Some(var) = self.interpolation(start)? {
                        if !text.is_empty() {
                            parts.push(StrPart::Text(std::mem::take(&mut text)));
                        }
                        parts.push(StrPart::Var(var));
                    } else {
                        text.push('$');
                    }
                }
                c => {
                    self.pos += c.len_utf8();
                    text.push(c);
                }
            }
        }
        if !text.is_empty() || parts.is_empty() {
            parts.push(StrPart::Text(text));
        }

        Ok(StrLit {
            span: Span::new(start, self.pos),
            quote,
            parts,
        })
    }

    /// Reads the reference after a `$`; `None` if the `$` is literal.
    fn interpolation(&mut self, string_start: usize) -> Result<Option<String>, SyntaxError> {
        let rest = self.rest();
        if rest.starts_with('{') {
            let mut depth = 0usize;
            for (i, c) in rest.char_indices() {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            let body = rest[1..i].trim().to_string();
                            self.pos += i + 1;
                            return Ok(Some(body));
                        }
                    }
                    _ => {}
                }
            }
            return Err(SyntaxError::new(
                string_start,
                "unterminated string interpolation",
            ));
        }

        let mut end = 0;
        let mut expect_start = true;
        for (i, c) in rest.char_indices() {
            if expect_start {
                if !is_ident_start(c) || c == '$' {
                    break;
                }
                expect_start = false;
                end = i + c.len_utf8();
            } else if is_ident_part(c) && c != '$' {
                end = i + c.len_utf8();
            } else if c == '.' {
                // `$a.b` continues only when an identifier follows the dot.
                expect_start = true;
            } else {
                break;
            }
        }
        if end == 0 {
            return Ok(None);
        }
        let var = rest[..end].to_string();
        self.pos += end;
        Ok(Some(var))
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}
