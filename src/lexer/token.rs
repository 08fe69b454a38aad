// src/lexer/token.rs

use std::borrow::Cow;

use crate::lexer::tables::TokenKind;

/// One scanned token; `start..end` are absolute byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Vec<u8>,
    pub start: usize,
    pub end: usize,
}

impl Token {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Lexeme as text; invalid UTF-8 is replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.lexeme)
    }
}
