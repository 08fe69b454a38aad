// src/dev/check.rs
// Stream invariants any token sequence from the scanner must satisfy.

use std::io::Read;

use crate::config::LexerOptions;
use crate::lexer::{Lexer, Token};
use crate::lexer::tables::TokenKind;

/// Reader that hands out one byte per `read` call.
pub struct OneByteReader<'a>(pub &'a [u8]);

impl Read for OneByteReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match (self.0.split_first(), buf.first_mut()) {
            (Some((&b, rest)), Some(slot)) => {
                *slot = b;
                self.0 = rest;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

/// Lex a byte slice to completion, END included.
pub fn lex_bytes(src: &[u8], options: &LexerOptions) -> Vec<Token> {
    Lexer::new(src, options.clone()).collect()
}

/// Tokens must tile the source exactly, be non-empty (except END), carry
/// their own source text, and end with a single END.
pub fn check_stream(src: &[u8], tokens: &[Token]) -> Result<(), String> {
    let Some((last, body)) = tokens.split_last() else {
        return Err("empty token stream".into());
    };
    if last.kind != TokenKind::End || last.start != src.len() || !last.is_empty() {
        return Err(format!("stream does not end with END at {}: {last:?}", src.len()));
    }
    let mut at = 0usize;
    for (i, t) in body.iter().enumerate() {
        if t.kind == TokenKind::End {
            return Err(format!("END before the end of input at token {i}"));
        }
        if t.start != at {
            return Err(format!(
                "gap or overlap at token {i}: expected start {at}, got {}",
                t.start
            ));
        }
        if t.end > src.len() {
            return Err(format!("token {i} ends past the input at {}", t.end));
        }
        if t.is_empty() {
            return Err(format!("empty {:?} token at {at}", t.kind));
        }
        if t.lexeme.as_slice() != &src[t.start..t.end] {
            return Err(format!("lexeme of token {i} does not match the source"));
        }
        at = t.end;
    }
    if at != src.len() {
        return Err(format!("tokens cover {at} of {} bytes", src.len()));
    }
    Ok(())
}
