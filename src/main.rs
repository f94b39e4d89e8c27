//! Command-line entry point: file mode and REPL mode over the
//! interpreter pipeline in `lib.rs`.
//!
//! # Usage
//!
//! ```text
//! ember            # start the REPL
//! ember script.em  # run a script file
//! ```

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use ember::diagnostics::Diagnostics;

/// A tree-walking interpreter.
#[derive(ClapParser, Debug)]
#[command(name = "ember", about = "A tree-walking interpreter.")]
struct Cli {
    /// Script to run. Omit to start the REPL.
    script: Option<PathBuf>,
}

#[derive(Debug)]
enum DriverError {
    ReadFile { path: PathBuf, source: io::Error },
    ReplIo(io::Error),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::ReadFile { path, source } => {
                write!(f, "could not read '{}': {source}", path.display())
            }
            DriverError::ReplIo(source) => write!(f, "REPL I/O error: {source}"),
        }
    }
}

impl std::error::Error for DriverError {}

fn main() -> ExitCode {
    env_logger::init();

    // More than one positional argument is a usage error with its own
    // exact message/exit-code contract, ahead of whatever clap would do
    // with an unrecognized extra positional.
    if std::env::args().count() > 2 {
        eprintln!("Usage: ember [script]");
        return ExitCode::from(64);
    }

    let cli = Cli::parse();
    let result = match cli.script {
        Some(path) => run_file(&path),
        None => run_prompt(),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(64)
        }
    }
}

fn run_file(path: &PathBuf) -> Result<ExitCode, DriverError> {
    let source = std::fs::read_to_string(path).map_err(|source| DriverError::ReadFile {
        path: path.clone(),
        source,
    })?;

    let mut diagnostics = Diagnostics::new();
    let stdout = io::stdout();
    ember::run(&source, &mut diagnostics, stdout.lock());

    if diagnostics.had_error() {
        Ok(ExitCode::from(65))
    } else if diagnostics.had_runtime_error() {
        Ok(ExitCode::from(70))
    } else {
        Ok(ExitCode::from(0))
    }
}

fn run_prompt() -> Result<ExitCode, DriverError> {
    let mut editor = rustyline::DefaultEditor::new().map_err(|e| {
        DriverError::ReplIo(io::Error::other(e.to_string()))
    })?;
    let mut diagnostics = Diagnostics::new();

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Eof)
            | Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(e) => return Err(DriverError::ReplIo(io::Error::other(e.to_string()))),
        };

        if line.is_empty() {
            break;
        }
        editor.add_history_entry(line.as_str()).ok();

        diagnostics.reset();
        let stdout = io::stdout();
        ember::run(&line, &mut diagnostics, stdout.lock());
        io::stdout().flush().ok();
    }

    Ok(ExitCode::from(0))
}
