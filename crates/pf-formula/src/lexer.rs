//! Tokenizer for formula text.

use pf_core::Real;

use crate::error::{FormulaError, FormulaResult};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(Real),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl TokenKind {
    /// Human-readable form used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Number(v) => format!("number {v}"),
            Self::Ident(name) => format!("'{name}'"),
            Self::Plus => "'+'".to_string(),
            Self::Minus => "'-'".to_string(),
            Self::Star => "'*'".to_string(),
            Self::Slash => "'/'".to_string(),
            Self::Caret => "'^'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Eof => "end of formula".to_string(),
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

struct Lexer<'a> {
    text: &'a str,
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            input: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: String) -> FormulaError {
        FormulaError::Parse {
            message,
            text: self.text.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn eat_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn next_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();
        let start = self.pos;

        let Some(ch) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: start,
            });
        };

        if ch.is_ascii_digit() || (ch == b'.' && self.peek_at(1).is_some_and(|b| b.is_ascii_digit())) {
            let value = self.scan_number()?;
            return Ok(Token {
                kind: TokenKind::Number(value),
                pos: start,
            });
        }

        if ch == b'_' || ch.is_ascii_alphabetic() {
            return Ok(Token {
                kind: TokenKind::Ident(self.scan_identifier()),
                pos: start,
            });
        }

        let kind = match ch {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'^' => TokenKind::Caret,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            _ => {
                let bad = self.text[start..].chars().next().unwrap_or('?');
                return Err(self.error(format!("unexpected character '{bad}' at position {start}")));
            }
        };
        self.pos += 1;
        Ok(Token { kind, pos: start })
    }

    /// `digits [. digits] [(e|E) [+|-] digits]`, or `. digits [...]`.
    fn scan_number(&mut self) -> FormulaResult<Real> {
        let start = self.pos;
        self.eat_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if self.eat_digits() == 0 {
                return Err(self.error(format!(
                    "malformed exponent in number '{}' at position {start}",
                    &self.text[start..self.pos]
                )));
            }
        }
        let literal = &self.text[start..self.pos];
        literal
            .parse::<Real>()
            .map_err(|_| self.error(format!("invalid number '{literal}' at position {start}")))
    }

    fn scan_identifier(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b == b'_' || b.is_ascii_alphanumeric())
        {
            self.pos += 1;
        }
        self.text[start..self.pos].to_string()
    }
}

/// Split formula text into tokens, always ending with [`TokenKind::Eof`].
pub fn tokenize(text: &str) -> FormulaResult<Vec<Token>> {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
