//! `cppi` — compiles and runs a single source file, or opens an
//! interactive loop when given none (§6).

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cppi_drv::{compile_and_run, Config};

/// A small compiler and interpreter for a strict subset of C++.
#[derive(Parser, Debug)]
#[command(name = "cppi")]
#[command(author = "Fax Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile and run a C++ subset source file", long_about = None)]
struct Cli {
    /// Source file to compile and run. Opens an interactive loop if omitted.
    file: Option<PathBuf>,

    /// Print the lexer's token stream to stderr before running.
    #[arg(long)]
    show_tokens: bool,

    /// Print the parsed AST to stderr before running.
    #[arg(long)]
    show_ast: bool,

    /// Narrate each compiler phase to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match &cli.file {
        Some(path) => run_file(path, &cli),
        None => run_repl(&cli),
    };

    match exit_code {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("cppi: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

fn run_file(path: &PathBuf, cli: &Cli) -> Result<i32> {
    let source = fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    let name = path.to_string_lossy().into_owned();
    show_intermediate(&source, cli);
    let config = Config { verbose: cli.verbose };
    let result = compile_and_run(&source, Some(&name), Some(config));
    report(&result);
    Ok(result.exit_code)
}

fn show_intermediate(source: &str, cli: &Cli) {
    if cli.show_tokens {
        let tokens = cppi_lex::tokenize(source);
        eprintln!("--- tokens ---");
        for token in &tokens {
            eprintln!("{token:?}");
        }
    }
    if cli.show_ast {
        eprintln!("--- ast ---");
        match cppi_par::parse(cppi_lex::tokenize(source)) {
            Ok(program) => eprintln!("{program:#?}"),
            Err(err) => eprintln!("(parse failed before an ast was available: {err})"),
        }
    }
}

fn report(result: &cppi_drv::CompileResult) {
    if !result.diagnostic_output.is_empty() {
        eprint!("{}", result.diagnostic_output);
    }
    print!("{}", result.execution_output);
    let _ = io::stdout().flush();
    if !result.success {
        if let Some(message) = &result.error {
            eprintln!("cppi: {message}");
        }
        for detail in &result.details {
            eprintln!("  - {detail}");
        }
    }
}

const REPL_HELP: &str = "\
Commands:
  EXIT       leave the interpreter
  HELP       show this message
  CLEAR      discard the current buffered program
  RUN        compile and run the buffered program now
  TOKENS     toggle printing the token stream before each run
  AST        toggle printing the parsed ast before each run
  VERBOSE    toggle phase narration
Anything else is appended to the buffered program. Once braces balance and
the buffer contains a main function, it is compiled and run automatically.";

struct ReplState {
    buffer: String,
    show_tokens: bool,
    show_ast: bool,
    verbose: bool,
}

fn run_repl(cli: &Cli) -> Result<i32> {
    println!("cppi interactive mode. Type HELP for commands, EXIT to quit.");
    let mut state = ReplState {
        buffer: String::new(),
        show_tokens: cli.show_tokens,
        show_ast: cli.show_ast,
        verbose: cli.verbose,
    };
    let stdin = io::stdin();
    loop {
        print!("cppi> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(0);
        }
        let trimmed = line.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "EXIT" => return Ok(0),
            "HELP" => {
                println!("{REPL_HELP}");
                continue;
            }
            "CLEAR" => {
                state.buffer.clear();
                continue;
            }
            "TOKENS" => {
                state.show_tokens = !state.show_tokens;
                println!("show-tokens: {}", state.show_tokens);
                continue;
            }
            "AST" => {
                state.show_ast = !state.show_ast;
                println!("show-ast: {}", state.show_ast);
                continue;
            }
            "VERBOSE" => {
                state.verbose = !state.verbose;
                println!("verbose: {}", state.verbose);
                continue;
            }
            "RUN" => {
                run_buffered(&mut state);
                continue;
            }
            _ => {}
        }
        state.buffer.push_str(&line);
        if braces_balanced(&state.buffer) && state.buffer.contains("main") {
            run_buffered(&mut state);
        }
    }
}

fn run_buffered(state: &mut ReplState) {
    if state.buffer.trim().is_empty() {
        return;
    }
    let cli = Cli {
        file: None,
        show_tokens: state.show_tokens,
        show_ast: state.show_ast,
        verbose: state.verbose,
    };
    show_intermediate(&state.buffer, &cli);
    let config = Config { verbose: state.verbose };
    let result = compile_and_run(&state.buffer, None, Some(config));
    report(&result);
    state.buffer.clear();
}

fn braces_balanced(source: &str) -> bool {
    let mut depth = 0i32;
    for ch in source.chars() {
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}
