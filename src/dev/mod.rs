// src/dev/mod.rs
// Helpers shared by the fuzz driver and the property tests.
pub mod check;
pub mod generator;

pub use check::{OneByteReader, check_stream, lex_bytes};
pub use generator::{gen_noise, gen_php_source};
