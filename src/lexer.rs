//! Scanner: source text to a flat token stream.
//!
//! Single pass, O(n) in source length. Lexical errors are reported into
//! the shared [`Diagnostics`] sink and scanning continues — a single run
//! should surface every lexical problem it can, not just the first.

use crate::diagnostics::Diagnostics;
use crate::token::{keyword, Literal, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a [u8],
    start: usize,
    current: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        let mut tokens = Vec::new();
        while !self.is_at_end() {
            self.start = self.current;
            if let Some(token) = self.scan_token(diagnostics) {
                tokens.push(token);
            }
        }
        tokens.push(Token::eof(self.line));
        log::debug!(
            "scanned {} tokens ({} lines)",
            tokens.len(),
            self.line
        );
        tokens
    }

    fn scan_token(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        let c = self.advance();
        use TokenKind::*;
        match c {
            b'(' => self.make(LeftParen),
            b')' => self.make(RightParen),
            b'{' => self.make(LeftBrace),
            b'}' => self.make(RightBrace),
            b',' => self.make(Comma),
            b'.' => self.make(Dot),
            b'-' => self.make(Minus),
            b'+' => self.make(Plus),
            b';' => self.make(Semicolon),
            b'*' => self.make(Star),
            b'!' => {
                let kind = if self.matches(b'=') { BangEqual } else { Bang };
                self.make(kind)
            }
            b'=' => {
                let kind = if self.matches(b'=') { EqualEqual } else { Equal };
                self.make(kind)
            }
            b'<' => {
                let kind = if self.matches(b'=') { LessEqual } else { Less };
                self.make(kind)
            }
            b'>' => {
                let kind = if self.matches(b'=') {
                    GreaterEqual
                } else {
                    Greater
                };
                self.make(kind)
            }
            b'/' => {
                if self.matches(b'/') {
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.current += 1;
                    }
                    None
                } else {
                    self.make(Slash)
                }
            }
            b' ' | b'\r' | b'\t' => None,
            b'\n' => {
                self.line += 1;
                None
            }
            b'"' => self.read_string(diagnostics),
            b'0'..=b'9' => Some(self.read_number()),
            c if is_alpha(c) => Some(self.read_identifier()),
            _ => {
                diagnostics.error(self.line, "Unexpected character.");
                None
            }
        }
    }

    fn read_string(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.current += 1;
        }

        if self.is_at_end() {
            diagnostics.error(self.line, "Unterminated string.");
            return None;
        }

        // Consume the closing quote.
        self.current += 1;

        let value = self.text(self.start + 1, self.current - 1);
        let lexeme = self.text(self.start, self.current);
        Some(Token::new(
            TokenKind::String,
            lexeme,
            Literal::Str(value),
            self.line,
        ))
    }

    fn read_number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.current += 1;
        }
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.current += 1;
            while self.peek().is_ascii_digit() {
                self.current += 1;
            }
        }
        let lexeme = self.text(self.start, self.current);
        let value: f64 = lexeme.parse().expect("scanner only emits valid numerals");
        Token::new(TokenKind::Number, lexeme, Literal::Number(value), self.line)
    }

    fn read_identifier(&mut self) -> Token {
        while is_alphanumeric(self.peek()) {
            self.current += 1;
        }
        let lexeme = self.text(self.start, self.current);
        let kind = keyword(&lexeme).unwrap_or(TokenKind::Identifier);
        Token::new(kind, lexeme, Literal::None, self.line)
    }

    fn make(&self, kind: TokenKind) -> Option<Token> {
        let lexeme = self.text(self.start, self.current);
        Some(Token::new(kind, lexeme, Literal::None, self.line))
    }

    fn text(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }

    fn advance(&mut self) -> u8 {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn matches(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            b'\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            b'\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_alphanumeric(c: u8) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut diagnostics = Diagnostics::new();
        Lexer::new(source)
            .scan_tokens(&mut diagnostics)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    // ==================== punctuation & operators ====================

    #[test]
    fn test_single_char_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds("(){},.-+;*"),
            vec![
                LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus, Semicolon,
                Star, Eof
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("!= == <= >= ! = < >"),
            vec![
                BangEqual, EqualEqual, LessEqual, GreaterEqual, Bang, Equal, Less, Greater, Eof
            ]
        );
    }

    #[test]
    fn test_comment_is_skipped() {
        use TokenKind::*;
        assert_eq!(kinds("// a comment\n+"), vec![Plus, Eof]);
    }

    // ==================== literals ====================

    #[test]
    fn test_string_literal_decodes_content() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Lexer::new("\"hi\"").scan_tokens(&mut diagnostics);
        assert_eq!(tokens[0].literal, Literal::Str("hi".to_string()));
        assert!(!diagnostics.had_error());
    }

    #[test]
    fn test_unterminated_string_reports_once() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Lexer::new("\"unterminated").scan_tokens(&mut diagnostics);
        assert!(diagnostics.had_error());
        assert_eq!(tokens, vec![Token::eof(1)]);
    }

    #[test]
    fn test_string_literal_spans_newlines() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Lexer::new("\"a\nb\"").scan_tokens(&mut diagnostics);
        assert_eq!(tokens[0].literal, Literal::Str("a\nb".to_string()));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_number_literal_with_fraction() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Lexer::new("123.45").scan_tokens(&mut diagnostics);
        assert_eq!(tokens[0].literal, Literal::Number(123.45));
    }

    #[test]
    fn test_trailing_dot_without_digit_is_not_consumed() {
        use TokenKind::*;
        assert_eq!(kinds("1."), vec![Number, Dot, Eof]);
    }

    #[test]
    fn test_identifier_vs_keyword() {
        use TokenKind::*;
        assert_eq!(kinds("foo and"), vec![Identifier, And, Eof]);
    }

    #[test]
    fn test_unexpected_character_reports_and_continues() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Lexer::new("@+").scan_tokens(&mut diagnostics);
        assert!(diagnostics.had_error());
        assert_eq!(tokens[0].kind, TokenKind::Plus);
    }

    #[test]
    fn test_empty_input_yields_only_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_line_tracking_across_newlines() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Lexer::new("1\n2\n3").scan_tokens(&mut diagnostics);
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 3]);
    }
}
