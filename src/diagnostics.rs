//! Run-scoped diagnostic sink.
//!
//! A single [`Diagnostics`] value is threaded by `&mut` through the
//! scanner, parser, and interpreter for the lifetime of one run (one file
//! execution, or one REPL line). It is deliberately not a process-global:
//! the REPL driver resets it between lines, and nothing outside the
//! pipeline ever touches it concurrently.

use crate::token::{Token, TokenKind};

#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Resets both flags. Called at the top of every REPL prompt.
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    /// Reports a scanner error: `[line N] Error: <msg>`.
    pub fn error(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Reports a parser error against a specific token.
    ///
    /// At EOF: `[line N] Error at end: <msg>`.
    /// Otherwise: `[line N] Error at <lexeme>: <msg>`.
    pub fn error_at_token(&mut self, token: &Token, message: &str) {
        if token.kind == TokenKind::Eof {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at {}", token.lexeme), message);
        }
    }

    fn report(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] Error{location}: {message}");
        log::debug!("diagnostic recorded at line {line}: {message}");
        self.had_error = true;
    }

    /// Reports an uncaught runtime error: `<msg>\n[line N]`.
    pub fn runtime_error(&mut self, line: usize, message: &str) {
        eprintln!("{message}\n[line {line}]");
        log::debug!("runtime error at line {line}: {message}");
        self.had_runtime_error = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Literal;

    #[test]
    fn test_reset_clears_both_flags() {
        let mut d = Diagnostics::new();
        d.error(1, "bad");
        d.runtime_error(2, "worse");
        assert!(d.had_error());
        assert!(d.had_runtime_error());
        d.reset();
        assert!(!d.had_error());
        assert!(!d.had_runtime_error());
    }

    #[test]
    fn test_error_at_token_eof_uses_at_end() {
        let mut d = Diagnostics::new();
        let eof = Token::new(TokenKind::Eof, "", Literal::None, 4);
        d.error_at_token(&eof, "Expect expression.");
        assert!(d.had_error());
    }

    #[test]
    fn test_fresh_diagnostics_has_no_errors() {
        let d = Diagnostics::new();
        assert!(!d.had_error());
        assert!(!d.had_runtime_error());
    }
}
