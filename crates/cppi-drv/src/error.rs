use cppi_par::SyntaxError;
use cppi_sem::SemanticError;
use thiserror::Error;

/// One variant per pipeline phase that can fail (§7). `cppi_lex` has no
/// variant here — lexing never fails; unknown bytes just become `Unknown`
/// tokens for the parser to reject.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("semantic analysis found {} error(s)", .0.len())]
    Semantic(Vec<SemanticError>),

    #[error(transparent)]
    Runtime(#[from] cppi_eval::RuntimeError),
}

impl CompileError {
    /// Per-error human messages, the `details` field of the final result.
    pub fn details(&self) -> Vec<String> {
        match self {
            CompileError::Syntax(err) => vec![err.to_string()],
            CompileError::Semantic(errors) => errors.iter().map(SemanticError::to_string).collect(),
            CompileError::Runtime(err) => vec![err.to_string()],
        }
    }
}
