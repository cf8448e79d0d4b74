//! Unit-string lexer.

use crate::{Error, Result};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Source span (byte offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unit name: letters, `_`, `.`, `°`, `μ`
    Ident,
    /// Optionally negative integer
    Digits,
    Caret,
    Star,
    Slash,
    LParen,
    RParen,
    /// Any other character; parsing stops here
    Other,
    Eof,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | '.' | '°' | 'μ')
}

/// Tokenize a unit string. Whitespace separates tokens and is otherwise ignored.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    let push = |tokens: &mut Vec<Token>, kind: TokenKind, start: usize, end: usize| {
        tokens.push(Token { kind, span: Span { start, end }, text: input[start..end].to_string() });
    };

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }

            c if is_ident_char(c) => {
                let mut end = pos;
                while let Some(&(i, c)) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                push(&mut tokens, TokenKind::Ident, pos, end);
            }

            c if c.is_ascii_digit() || (c == '-' && matches!(chars.clone().nth(1), Some((_, d)) if d.is_ascii_digit())) => {
                chars.next();
                let mut end = pos + 1;
                while let Some(&(i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + 1;
                    chars.next();
                }
                push(&mut tokens, TokenKind::Digits, pos, end);
            }

            '^' | '*' | '/' | '(' | ')' => {
                chars.next();
                let kind = match ch {
                    '^' => TokenKind::Caret,
                    '*' => TokenKind::Star,
                    '/' => TokenKind::Slash,
                    '(' => TokenKind::LParen,
                    _ => TokenKind::RParen,
                };
                push(&mut tokens, kind, pos, pos + 1);
            }

            _ => {
                chars.next();
                push(&mut tokens, TokenKind::Other, pos, pos + ch.len_utf8());
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span { start: input.len(), end: input.len() },
        text: String::new(),
    });
    Ok(tokens)
}

/// Parse the text of a `Digits` token.
pub(crate) fn digits_value(token: &Token) -> Result<i64> {
    token.text.parse().map_err(|_| Error::UnitSyntax {
        position: token.span.start,
        message: format!("Integer out of range: {}", token.text),
    })
}
