//! Recursive-descent parser: tokens to a statement list.
//!
//! On a parse error the error is reported into the shared `Diagnostics`
//! sink and the parser synchronizes to the next statement boundary
//! (panic-mode recovery) so a single pass can surface more than one
//! error.
//!
//! # Grammar
//!
//! ```text
//! program    := declaration* EOF
//! declaration:= funDecl | varDecl | statement
//! funDecl    := "fun" function
//! function   := IDENT "(" params? ")" "{" block
//! params     := IDENT ("," IDENT)*
//! varDecl    := "var" IDENT ("=" expression)? ";"
//! statement  := exprStmt | forStmt | ifStmt | printStmt
//!             | returnStmt | whileStmt | block
//! block      := "{" declaration* "}"
//! expression := assignment
//! assignment := IDENT "=" assignment | logic_or
//! logic_or   := logic_and ("or" logic_and)*
//! logic_and  := equality ("and" equality)*
//! equality   := comparison (("!="|"==") comparison)*
//! comparison := term ((">"|">="|"<"|"<=") term)*
//! term       := factor (("+"|"-") factor)*
//! factor     := unary (("*"|"/") unary)*
//! unary      := ("!"|"-") unary | call
//! call       := primary ("(" args? ")")*
//! args       := expression ("," expression)*
//! primary    := "true"|"false"|"nil"|NUMBER|STRING
//!             | IDENT | "(" expression ")"
//! ```

use std::rc::Rc;

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::diagnostics::Diagnostics;
use crate::token::{Literal, Token, TokenKind};

const MAX_ARGS: usize = 255;

/// Internal signal for "a parse error occurred here"; already reported
/// to `Diagnostics` by the time it propagates, used only to unwind to the
/// nearest `declaration` call for synchronization.
struct ParseError;

pub struct Parser<'d> {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> Parser<'d> {
    pub fn new(tokens: Vec<Token>, diagnostics: &'d mut Diagnostics) -> Self {
        Parser {
            tokens,
            current: 0,
            diagnostics,
        }
    }

    pub fn parse(mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        log::debug!("parsed {} top-level statements", statements.len());
        statements
    }

    // ==================== declarations ====================

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.check(TokenKind::Fun) {
            self.advance();
            self.function_decl()
        } else if self.check(TokenKind::Var) {
            self.advance();
            self.var_decl()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn function_decl(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "Expect function name.")?;
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.error_at_current("Can't have more than 255 parameters.");
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;
        let body = self.block()?;
        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    fn var_decl(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.matches(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(name, initializer))
    }

    // ==================== statements ====================

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.matches(TokenKind::For) {
            return self.for_stmt();
        }
        if self.matches(TokenKind::If) {
            return self.if_stmt();
        }
        if self.matches(TokenKind::Print) {
            return self.print_stmt();
        }
        if self.matches(TokenKind::Return) {
            return self.return_stmt();
        }
        if self.matches(TokenKind::While) {
            return self.while_stmt();
        }
        if self.matches(TokenKind::LeftBrace) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expr_stmt()
    }

    fn for_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::Var) {
            self.advance();
            Some(self.var_decl()?)
        } else {
            Some(self.expr_stmt()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            self.expression()?
        } else {
            Expr::Literal(LiteralValue::Bool(true))
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }
        body = Stmt::While(condition, Box::new(body));
        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }
        Ok(body)
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If(condition, then_branch, else_branch))
    }

    fn print_stmt(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        let value = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(keyword, value))
    }

    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(condition, body))
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    // ==================== expressions ====================

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.or()?;

        if self.matches(TokenKind::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;
            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign(name, Box::new(value))),
                _ => {
                    self.diagnostics
                        .error_at_token(&equals, "Invalid assignment target.");
                    Ok(value)
                }
            };
        }
        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.check(TokenKind::Or) {
            let op = self.advance().clone();
            let right = self.and()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.check(TokenKind::And) {
            let op = self.advance().clone();
            let right = self.equality()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        self.binary_left(
            Self::comparison,
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
        )
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        self.binary_left(
            Self::term,
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
        )
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        self.binary_left(Self::factor, &[TokenKind::Minus, TokenKind::Plus])
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        self.binary_left(Self::unary, &[TokenKind::Slash, TokenKind::Star])
    }

    fn binary_left(
        &mut self,
        mut operand: impl FnMut(&mut Self) -> Result<Expr, ParseError>,
        kinds: &[TokenKind],
    ) -> Result<Expr, ParseError> {
        let mut expr = operand(self)?;
        while kinds.contains(&self.peek().kind) {
            let op = self.advance().clone();
            let right = operand(self)?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Bang) || self.check(TokenKind::Minus) {
            let op = self.advance().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(op, Box::new(right)));
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(TokenKind::LeftParen) {
                expr = self.finish_call(expr)?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARGS {
                    self.error_at_current("Can't have more than 255 arguments.");
                }
                args.push(self.expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call(Box::new(callee), paren, args))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(TokenKind::False) {
            return Ok(Expr::Literal(LiteralValue::Bool(false)));
        }
        if self.matches(TokenKind::True) {
            return Ok(Expr::Literal(LiteralValue::Bool(true)));
        }
        if self.matches(TokenKind::Nil) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }
        if self.check(TokenKind::Number) || self.check(TokenKind::String) {
            let token = self.advance().clone();
            let value = match token.literal {
                Literal::Number(n) => LiteralValue::Number(n),
                Literal::Str(s) => LiteralValue::Str(s),
                Literal::None => unreachable!("scanner always attaches a literal"),
            };
            return Ok(Expr::Literal(value));
        }
        if self.check(TokenKind::Identifier) {
            let token = self.advance().clone();
            return Ok(Expr::Variable(token));
        }
        if self.matches(TokenKind::LeftParen) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }
        Err(self.error_at_current("Expect expression."))
    }

    // ==================== helpers ====================

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn error_at_current(&mut self, message: &str) -> ParseError {
        let token = self.peek().clone();
        self.diagnostics.error_at_token(&token, message);
        ParseError
    }

    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            use TokenKind::*;
            match self.peek().kind {
                Class | Fun | Var | For | If | While | Print | Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
