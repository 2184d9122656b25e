//! Scoped semantic analysis over the parsed AST: name resolution, the
//! numeric promotion lattice, and the scoping quirks described in §4.3.
//!
//! Unlike the lexer and parser, this phase accumulates every error it can
//! find rather than stopping at the first one.

mod analyzer;
mod error;
mod scope;
mod types;

pub use analyzer::analyze;
pub use error::SemanticError;
pub use scope::{Binding, Scope, ScopeId, ScopeKind, ScopeTree};
pub use types::Type;
