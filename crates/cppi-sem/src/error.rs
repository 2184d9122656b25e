use cppi_util::Span;
use thiserror::Error;

use crate::types::Type;

/// Every way a syntactically valid program can fail semantic analysis.
///
/// Unlike [`cppi_par::SyntaxError`], the analyzer does not stop at the first
/// mistake: it keeps walking so a caller sees every reachable error in one
/// pass (§4.3), and returns them all inside a `DiagnosticBag`-style list.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemanticError {
    #[error("'{name}' is already defined in this scope at line {line}")]
    Redefinition { name: String, line: u32, column: u32 },

    #[error("'{name}' is used before it is initialized at line {line}")]
    UseBeforeInit { name: String, line: u32, column: u32 },

    #[error("'{name}' is not defined at line {line}")]
    UndefinedName { name: String, line: u32, column: u32 },

    #[error("type mismatch at line {line}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Type,
        found: Type,
        line: u32,
        column: u32,
    },

    #[error("condition at line {line} must be bool-like, found {found}")]
    BadCondition { found: Type, line: u32, column: u32 },

    #[error("return type mismatch at line {line}: function returns {expected}, found {found}")]
    BadReturn {
        expected: Type,
        found: Type,
        line: u32,
        column: u32,
    },

    #[error("'main' is not defined")]
    MissingMain,

    #[error("'main' must return int or void, found {found}")]
    BadMainSignature { found: Type },

    #[error("call to undefined function '{name}' at line {line}")]
    UndefinedFunction { name: String, line: u32, column: u32 },

    #[error("'{name}' expects {expected} argument(s), found {found} at line {line}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        line: u32,
        column: u32,
    },

    #[error("cannot assign to '{name}' at line {line}: it is not declared in any enclosing scope")]
    AssignToUndeclared { name: String, line: u32, column: u32 },
}

impl SemanticError {
    pub fn span(&self) -> Span {
        let (line, column) = match self {
            SemanticError::Redefinition { line, column, .. }
            | SemanticError::UseBeforeInit { line, column, .. }
            | SemanticError::UndefinedName { line, column, .. }
            | SemanticError::TypeMismatch { line, column, .. }
            | SemanticError::BadCondition { line, column, .. }
            | SemanticError::BadReturn { line, column, .. }
            | SemanticError::UndefinedFunction { line, column, .. }
            | SemanticError::ArityMismatch { line, column, .. }
            | SemanticError::AssignToUndeclared { line, column, .. } => (*line, *column),
            SemanticError::MissingMain | SemanticError::BadMainSignature { .. } => (0, 0),
        };
        Span::point(0, line, column)
    }
}
