//! End-to-end tests driving the built `cppi` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn cppi() -> Command {
    Command::cargo_bin("cppi").expect("cppi binary should build")
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    write!(file, "{contents}").expect("failed to write fixture source");
    file
}

#[test]
fn help_flag_prints_usage() {
    cppi()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage").or(predicate::str::contains("cppi")));
}

#[test]
fn version_flag_prints_version() {
    cppi()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cppi"));
}

#[test]
fn compiling_hello_world_prints_output_and_exits_zero() {
    let file = source_file(
        "#include <iostream>\nusing namespace std;\nint main(){ cout << \"Hello, World!\" << endl; return 0; }",
    );
    cppi()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::eq("Hello, World!\n"));
}

#[test]
fn main_return_value_becomes_the_process_exit_code() {
    let file = source_file("int main(){ return 7; }");
    cppi().arg(file.path()).assert().code(7);
}

#[test]
fn a_semantic_error_exits_with_code_one_and_reports_on_stderr() {
    let file = source_file("int main(){ int x; cout << x; return 0; }");
    cppi()
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains('x'));
}

#[test]
fn missing_input_file_is_reported_without_panicking() {
    cppi()
        .arg("does/not/exist.cpp")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does/not/exist.cpp"));
}

#[test]
fn show_tokens_writes_to_stderr_before_running() {
    let file = source_file("int main(){ return 0; }");
    cppi()
        .arg(file.path())
        .arg("--show-tokens")
        .assert()
        .success()
        .stderr(predicate::str::contains("tokens"));
}

#[test]
fn show_ast_writes_to_stderr_before_running() {
    let file = source_file("int main(){ return 0; }");
    cppi()
        .arg(file.path())
        .arg("--show-ast")
        .assert()
        .success()
        .stderr(predicate::str::contains("ast"));
}

#[test]
fn verbose_flag_narrates_phases_on_stderr() {
    let file = source_file("int main(){ return 0; }");
    cppi()
        .arg(file.path())
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("lexing").or(predicate::str::contains("parsing")));
}

#[test]
fn repl_help_then_exit_leaves_cleanly() {
    cppi()
        .write_stdin("HELP\nEXIT\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands"));
}

#[test]
fn repl_auto_runs_once_a_main_function_balances_its_braces() {
    cppi()
        .write_stdin("int main(){ cout << 42 << endl; return 0; }\nEXIT\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("42"));
}

#[test]
fn repl_clear_discards_the_buffered_program() {
    cppi()
        .write_stdin("int main(){\nCLEAR\nEXIT\n")
        .assert()
        .success();
}
