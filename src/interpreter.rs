//! Tree-walking evaluator.
//!
//! Executes a statement list against a lexically scoped environment
//! chain. Runtime errors unwind to `interpret` via [`Unwind::Error`] and
//! are reported into the shared `Diagnostics` sink; `return` unwinds the
//! same way via [`Unwind::Return`] but is caught at the call boundary and
//! never reaches diagnostics.

use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::diagnostics::Diagnostics;
use crate::environment::Environment;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    Callable(Callable),
}

#[derive(Clone)]
pub enum Callable {
    Native {
        name: &'static str,
        arity: usize,
        func: fn(&[Value]) -> Value,
    },
    User {
        decl: Rc<FunctionDecl>,
        closure: Environment,
    },
}

impl Callable {
    fn arity(&self) -> usize {
        match self {
            Callable::Native { arity, .. } => *arity,
            Callable::User { decl, .. } => decl.params.len(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Callable::Native { name, .. } => name,
            Callable::User { decl, .. } => &decl.name.lexeme,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::Callable(c) => write!(f, "<fn {}>", c.name()),
        }
    }
}

/// Non-local control transfer: either an uncaught runtime error, or a
/// `return` unwinding toward the nearest call frame.
enum Unwind {
    Error { message: String, line: usize },
    Return(Value),
}

type EvalResult<T> = Result<T, Unwind>;

fn runtime_error(line: usize, message: impl Into<String>) -> Unwind {
    Unwind::Error {
        message: message.into(),
        line,
    }
}

pub struct Interpreter<'d, W: std::io::Write> {
    globals: Environment,
    environment: Environment,
    diagnostics: &'d mut Diagnostics,
    out: W,
}

impl<'d, W: std::io::Write> Interpreter<'d, W> {
    pub fn new(diagnostics: &'d mut Diagnostics, out: W) -> Self {
        let globals = Environment::global();
        globals.define(
            "clock",
            Value::Callable(Callable::Native {
                name: "clock",
                arity: 0,
                func: |_args| {
                    let now = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .unwrap_or_default();
                    Value::Number(now.as_secs_f64())
                },
            }),
        );
        Interpreter {
            environment: globals.clone(),
            globals,
            diagnostics,
            out,
        }
    }

    pub fn interpret(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            if let Err(unwind) = self.execute(stmt) {
                match unwind {
                    Unwind::Error { message, line } => {
                        self.diagnostics.runtime_error(line, &message);
                    }
                    Unwind::Return(_) => {
                        // A top-level `return` outside any function body;
                        // nothing to unwind into, simply stop this run.
                    }
                }
                return;
            }
        }
        log::debug!("interpreted {} top-level statements", statements.len());
    }

    fn execute(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{value}").ok();
                Ok(())
            }
            Stmt::Var(name, initializer) => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let enclosing = self.environment.clone();
                self.environment = Environment::with_enclosing(&enclosing);
                let result = self.execute_block(statements);
                self.environment = enclosing;
                result
            }
            Stmt::If(cond, then_branch, else_branch) => {
                if is_truthy(&self.evaluate(cond)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(cond, body) => {
                while is_truthy(&self.evaluate(cond)?) {
                    self.execute(body)?;
                }
                Ok(())
            }
            Stmt::Function(decl) => {
                let callable = Value::Callable(Callable::User {
                    decl: Rc::clone(decl),
                    closure: self.environment.clone(),
                });
                self.environment.define(&decl.name.lexeme, callable);
                Ok(())
            }
            Stmt::Return(_, value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(Unwind::Return(value))
            }
        }
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> EvalResult<()> {
        for stmt in statements {
            self.execute(stmt)?;
        }
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(literal_value(value)),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Variable(name) => self
                .environment
                .get(name)
                .map_err(|msg| runtime_error(name.line, msg)),
            Expr::Assign(name, value) => {
                let value = self.evaluate(value)?;
                self.environment
                    .assign(name, value.clone())
                    .map_err(|msg| runtime_error(name.line, msg))?;
                Ok(value)
            }
            Expr::Unary(op, right) => self.eval_unary(op, right),
            Expr::Binary(left, op, right) => self.eval_binary(left, op, right),
            Expr::Logical(left, op, right) => self.eval_logical(left, op, right),
            Expr::Call(callee, paren, args) => self.eval_call(callee, paren, args),
        }
    }

    fn eval_unary(&mut self, op: &Token, right: &Expr) -> EvalResult<Value> {
        let right = self.evaluate(right)?;
        match op.kind {
            TokenKind::Minus => {
                let n = as_number(&right).ok_or_else(|| {
                    runtime_error(op.line, "Operand must be a number.")
                })?;
                Ok(Value::Number(-n))
            }
            TokenKind::Bang => Ok(Value::Bool(!is_truthy(&right))),
            _ => unreachable!("parser only produces ! and - as unary operators"),
        }
    }

    fn eval_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> EvalResult<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        use TokenKind::*;
        match op.kind {
            Minus | Slash | Star | Greater | GreaterEqual | Less | LessEqual => {
                let (a, b) = self.as_number_pair(op.line, &left, &right)?;
                Ok(match op.kind {
                    Minus => Value::Number(a - b),
                    Slash => Value::Number(a / b),
                    Star => Value::Number(a * b),
                    Greater => Value::Bool(a > b),
                    GreaterEqual => Value::Bool(a >= b),
                    Less => Value::Bool(a < b),
                    LessEqual => Value::Bool(a <= b),
                    _ => unreachable!(),
                })
            }
            Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
                _ => Err(runtime_error(
                    op.line,
                    "Operands must be two numbers or strings.",
                )),
            },
            BangEqual => Ok(Value::Bool(!is_equal(&left, &right))),
            EqualEqual => Ok(Value::Bool(is_equal(&left, &right))),
            _ => unreachable!("parser only produces these kinds as binary operators"),
        }
    }

    fn eval_logical(&mut self, left: &Expr, op: &Token, right: &Expr) -> EvalResult<Value> {
        let left = self.evaluate(left)?;
        if op.kind == TokenKind::Or {
            if is_truthy(&left) {
                return Ok(left);
            }
        } else if !is_truthy(&left) {
            return Ok(left);
        }
        self.evaluate(right)
    }

    fn eval_call(&mut self, callee: &Expr, paren: &Token, args: &[Expr]) -> EvalResult<Value> {
        let callee_value = self.evaluate(callee)?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate(arg)?);
        }

        let callable = match callee_value {
            Value::Callable(c) => c,
            _ => {
                return Err(runtime_error(
                    paren.line,
                    "Can only call functions and classes.",
                ))
            }
        };

        if arg_values.len() != callable.arity() {
            return Err(runtime_error(
                paren.line,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arg_values.len()
                ),
            ));
        }

        match callable {
            Callable::Native { func, .. } => Ok(func(&arg_values)),
            Callable::User { decl, closure } => self.call_user(&decl, &closure, &arg_values),
        }
    }

    fn call_user(
        &mut self,
        decl: &FunctionDecl,
        closure: &Environment,
        args: &[Value],
    ) -> EvalResult<Value> {
        let call_env = Environment::with_enclosing(closure);
        for (param, arg) in decl.params.iter().zip(args) {
            call_env.define(&param.lexeme, arg.clone());
        }

        let enclosing = self.environment.clone();
        self.environment = call_env;
        let result = self.execute_block(&decl.body);
        self.environment = enclosing;

        match result {
            Ok(()) => Ok(Value::Nil),
            Err(Unwind::Return(value)) => Ok(value),
            Err(err) => Err(err),
        }
    }

    fn as_number_pair(&self, line: usize, left: &Value, right: &Value) -> EvalResult<(f64, f64)> {
        match (as_number(left), as_number(right)) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(runtime_error(line, "Operands must be a number.")),
        }
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Nil => Value::Nil,
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::Str(s.clone()),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        _ => None,
    }
}

/// `nil` and `false` are falsy; every other value is truthy.
fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Nil | Value::Bool(false))
}

/// Cross-kind equality is always defined: `nil == nil` is true, `nil` vs
/// anything else is false, otherwise structural equality. Never raises a
/// number-operand error (resolved Open Question: relaxed semantics).
fn is_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Nil, _) | (_, Value::Nil) => false,
        _ => a == b,
    }
}
