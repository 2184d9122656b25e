//! Recursive-descent parser: turns a token stream into the AST.
//!
//! Parsing stops at the first malformed construct (§4.2) — unlike the
//! semantic analyzer, which keeps going to collect every error it can.

mod ast;
mod error;
mod parser;

pub use ast::{BinOp, Expr, IncDecOp, Literal, Param, Program, Stmt, TypeName, UnOp};
pub use error::SyntaxError;
pub use parser::Parser;

use cppi_lex::Token;

/// Convenience entry point: parses a complete token stream into a `Program`.
pub fn parse(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    Parser::new(tokens).parse_program()
}
