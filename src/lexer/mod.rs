// src/lexer/mod.rs
pub mod action;
pub mod buffer;
pub mod scanner;
pub mod state;
pub mod tables;
pub mod token;

pub use scanner::Lexer;
pub use state::{HeredocLabel, LexicalState};
pub use token::Token;
