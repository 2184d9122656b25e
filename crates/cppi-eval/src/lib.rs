//! Tree-walking evaluator and output runtime (§4.4): executes an analyzed
//! `Program` and produces the exit code and captured `cout` text a host
//! driver folds into its `compile_and_run` result.

mod error;
mod evaluator;
mod frame;
mod value;

pub use error::RuntimeError;
pub use evaluator::{run, RunOutcome};
pub use value::Value;
