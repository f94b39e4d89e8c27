//! Library surface for the interpreter pipeline: scanner, parser,
//! environment, and tree-walking evaluator. `main.rs` is a thin CLI/REPL
//! shell over [`run`].

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;

use diagnostics::Diagnostics;
use interpreter::Interpreter;
use lexer::Lexer;
use parser::Parser;

/// Runs one unit of source (a whole file, or one REPL line) against a
/// fresh `Diagnostics` borrow, writing `print` output to `out`.
///
/// Parsing errors short-circuit before interpretation: nothing is
/// executed once `diagnostics.had_error()` is set by the parse phase.
pub fn run(source: &str, diagnostics: &mut Diagnostics, out: impl std::io::Write) {
    let tokens = Lexer::new(source).scan_tokens(diagnostics);
    let statements = Parser::new(tokens, diagnostics).parse();

    if diagnostics.had_error() {
        return;
    }

    let mut interpreter = Interpreter::new(diagnostics, out);
    interpreter.interpret(&statements);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_stops_before_interpreting_on_parse_error() {
        let mut diagnostics = Diagnostics::new();
        let mut out = Vec::new();
        run("var ; print 1+2;", &mut diagnostics, &mut out);
        assert!(diagnostics.had_error());
        assert_eq!(out, b"");
    }

    #[test]
    fn test_run_executes_valid_source() {
        let mut diagnostics = Diagnostics::new();
        let mut out = Vec::new();
        run("print 1 + 1;", &mut diagnostics, &mut out);
        assert!(!diagnostics.had_error());
        assert_eq!(out, b"2\n");
    }
}
