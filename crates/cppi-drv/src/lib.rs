//! Wires the four pipeline phases together behind one infallible entry
//! point (§6): `compile_and_run` lexes, parses, analyzes, and evaluates a
//! single source string, turning whichever phase fails first into a
//! `CompileResult` rather than propagating an error to the caller.

mod config;
mod error;
mod result;

pub use config::Config;
pub use error::CompileError;
pub use result::CompileResult;

use tracing::debug;

/// Runs the full pipeline over `source` and reports what happened.
///
/// `filename` is used only for diagnostic narration; the pipeline still
/// compiles a single in-memory fragment regardless of what it is named
/// (§5). Passing `None` for `config` reproduces the same `success`,
/// `execution_output`, and `exit_code` as any other `Config` — verbosity
/// changes `diagnostic_output` alone.
pub fn compile_and_run(source: &str, filename: Option<&str>, config: Option<Config>) -> CompileResult {
    let config = config.unwrap_or_default();
    let name = filename.unwrap_or("<input>");
    let mut diagnostic = String::new();

    narrate(&mut diagnostic, config.verbose, &format!("lexing {name}"));
    let tokens = cppi_lex::tokenize(source);
    debug!(phase = "lex", file = name, tokens = tokens.len());
    narrate(&mut diagnostic, config.verbose, &format!("{} tokens produced", tokens.len()));

    narrate(&mut diagnostic, config.verbose, "parsing");
    let program = match cppi_par::parse(tokens) {
        Ok(program) => program,
        Err(err) => {
            debug!(phase = "parse", file = name, error = %err);
            return failure(CompileError::Syntax(err), diagnostic, String::new());
        }
    };
    narrate(&mut diagnostic, config.verbose, "parsed successfully");

    narrate(&mut diagnostic, config.verbose, "running semantic analysis");
    let errors = cppi_sem::analyze(&program);
    if !errors.is_empty() {
        debug!(phase = "semantic", file = name, error_count = errors.len());
        narrate(&mut diagnostic, config.verbose, &format!("{} semantic error(s) found", errors.len()));
        return failure(CompileError::Semantic(errors), diagnostic, String::new());
    }
    narrate(&mut diagnostic, config.verbose, "semantic analysis passed");

    narrate(&mut diagnostic, config.verbose, "evaluating");
    let outcome = cppi_eval::run(&program);
    match outcome.exit_code {
        Ok(code) => {
            debug!(phase = "eval", file = name, exit_code = code);
            narrate(&mut diagnostic, config.verbose, &format!("program exited with code {code}"));
            CompileResult {
                success: true,
                error: None,
                details: Vec::new(),
                execution_output: outcome.output,
                diagnostic_output: diagnostic,
                exit_code: code,
            }
        }
        Err(err) => {
            debug!(phase = "eval", file = name, error = %err);
            failure(CompileError::Runtime(err), diagnostic, outcome.output)
        }
    }
}

fn narrate(diagnostic: &mut String, verbose: bool, line: &str) {
    if verbose {
        diagnostic.push_str(line);
        diagnostic.push('\n');
    }
}

fn failure(err: CompileError, diagnostic_output: String, execution_output: String) -> CompileResult {
    CompileResult {
        success: false,
        error: Some(err.to_string()),
        details: err.details(),
        execution_output,
        diagnostic_output,
        exit_code: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_scenario() {
        let source = "#include <iostream>\nusing namespace std;\nint main(){ cout << \"Hello, World!\" << endl; return 0; }";
        let result = compile_and_run(source, None, None);
        assert!(result.success);
        assert_eq!(result.execution_output, "Hello, World!\n");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn arithmetic_scenario() {
        let source = "int main(){ int x=10; int y=20; cout << (x+y) << endl; return 0; }";
        let result = compile_and_run(source, None, None);
        assert!(result.success);
        assert_eq!(result.execution_output, "30\n");
    }

    #[test]
    fn function_call_scenario() {
        let source = "int add(int a,int b){ return a+b; } int main(){ cout << add(5,3) << endl; return 0; }";
        let result = compile_and_run(source, None, None);
        assert!(result.success);
        assert_eq!(result.execution_output, "8\n");
    }

    #[test]
    fn for_loop_scenario() {
        let source = "int main(){ for(int i=1;i<=3;i=i+1){ cout << i << \" \"; } cout << endl; return 0; }";
        let result = compile_and_run(source, None, None);
        assert!(result.success);
        assert_eq!(result.execution_output, "1 2 3 \n");
    }

    #[test]
    fn use_before_init_scenario_fails_semantically() {
        let source = "int main(){ int x; cout << x; return 0; }";
        let result = compile_and_run(source, None, None);
        assert!(!result.success);
        assert!(result.details.iter().any(|d| d.contains('x')));
    }

    #[test]
    fn if_else_early_return_scenario() {
        let source = "int main(){ if (2>1) return 7; else return 9; }";
        let result = compile_and_run(source, None, None);
        assert!(result.success);
        assert_eq!(result.execution_output, "");
        assert_eq!(result.exit_code, 7);
    }

    #[test]
    fn empty_program_reports_missing_main() {
        let result = compile_and_run("", None, None);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
        assert!(result.error.as_ref().unwrap().contains("main"));
    }

    #[test]
    fn redefinition_in_same_scope_is_reported() {
        let source = "int main(){ int x = 1; int x = 2; return 0; }";
        let result = compile_and_run(source, None, None);
        assert!(!result.success);
    }

    #[test]
    fn redefinition_in_inner_scope_is_accepted() {
        let source = "int main(){ int x = 1; { int x = 2; } return 0; }";
        let result = compile_and_run(source, None, None);
        assert!(result.success);
    }

    #[test]
    fn bad_return_type_is_a_semantic_error() {
        let source = r#"int give(){ return "not an int"; } int main(){ return 0; }"#;
        let result = compile_and_run(source, None, None);
        assert!(!result.success);
    }

    #[test]
    fn verbose_config_narrates_without_changing_the_program_result() {
        let source = "int main(){ return 3; }";
        let quiet = compile_and_run(source, None, None);
        let loud = compile_and_run(source, None, Some(Config { verbose: true }));
        assert_eq!(quiet.success, loud.success);
        assert_eq!(quiet.execution_output, loud.execution_output);
        assert_eq!(quiet.exit_code, loud.exit_code);
        assert!(quiet.diagnostic_output.is_empty());
        assert!(!loud.diagnostic_output.is_empty());
    }

    #[test]
    fn idempotent_across_repeated_runs() {
        let source = "int main(){ cout << 1 << 2 << 3 << endl; return 0; }";
        let first = compile_and_run(source, None, None);
        let second = compile_and_run(source, None, None);
        assert_eq!(first.execution_output, second.execution_output);
        assert_eq!(first.exit_code, second.exit_code);
    }
}
