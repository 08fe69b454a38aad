// src/lib.rs
pub mod config;
pub mod dev;
pub mod lexer;
pub mod logging;

pub use config::{LexerOptions, PhpVersion, load_options};
pub use lexer::tables::{Tables, TokenKind};
pub use lexer::{HeredocLabel, Lexer, LexicalState, Token};

/// Scan a whole source held in memory. The trailing END token is not included.
pub fn tokenize(src: &str, options: &LexerOptions) -> Vec<Token> {
    Lexer::new(src.as_bytes(), options.clone())
        .take_while(|t| t.kind != TokenKind::End)
        .collect()
}
