use cppi_util::Span;
use thiserror::Error;

/// Every way a program that already passed semantic analysis can still fail
/// once it runs (§4.4, §7). Reaching this phase means the lexer, parser, and
/// analyzer all agreed the program is well-formed; these variants cover what
/// no static check rules out, plus a catch-all for AST shapes the tree
/// walker was never taught to execute.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("'main' is not defined")]
    MissingMain,

    #[error("division by zero at line {line}")]
    DivisionByZero { line: u32, column: u32 },

    #[error("unsupported construct: {detail}")]
    Unsupported { detail: String },
}

impl RuntimeError {
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::DivisionByZero { line, column } => Span::point(0, *line, *column),
            RuntimeError::MissingMain | RuntimeError::Unsupported { .. } => Span::point(0, 0, 0),
        }
    }
}
