//! Turns C++-subset source text into a flat stream of tokens.
//!
//! Lexing is total: every input produces a token stream ending in exactly
//! one `Eof`, with `Unknown` tokens standing in for anything unrecognised.
//! Nothing here can fail, so there is no error type in this crate.

mod cursor;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};

/// Convenience entry point: lexes `source` to completion.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
