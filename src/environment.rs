//! Lexically nested environment frames.
//!
//! A frame is shared (via `Rc<RefCell<_>>`) between the active call stack
//! and any closures that captured it, since mutation through one handle
//! must be visible through all of them — that's the closure semantics the
//! language requires (see `makeCounter`-style examples).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::interpreter::Value;
use crate::token::Token;

#[derive(Debug)]
struct EnvironmentData {
    values: HashMap<String, Value>,
    enclosing: Option<Environment>,
}

#[derive(Debug, Clone)]
pub struct Environment(Rc<RefCell<EnvironmentData>>);

impl Environment {
    pub fn global() -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentData {
            values: HashMap::new(),
            enclosing: None,
        })))
    }

    pub fn with_enclosing(enclosing: &Environment) -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentData {
            values: HashMap::new(),
            enclosing: Some(enclosing.clone()),
        })))
    }

    /// Unconditional insert/overwrite in this frame.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, String> {
        let data = self.0.borrow();
        if let Some(value) = data.values.get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(parent) = &data.enclosing {
            return parent.get(name);
        }
        Err(format!("Undefined variable \"{}\".", name.lexeme))
    }

    pub fn assign(&self, name: &Token, value: Value) -> Result<(), String> {
        let mut data = self.0.borrow_mut();
        if data.values.contains_key(&name.lexeme) {
            data.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }
        match &data.enclosing {
            Some(parent) => parent.assign(name, value),
            None => Err(format!("Undefined variable \"{}\".", name.lexeme)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, TokenKind};

    fn tok(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, Literal::None, 1)
    }

    #[test]
    fn test_define_then_get() {
        let env = Environment::global();
        env.define("a", Value::Number(1.0));
        assert_eq!(env.get(&tok("a")), Ok(Value::Number(1.0)));
    }

    #[test]
    fn test_get_undefined_reports_exact_message() {
        let env = Environment::global();
        assert_eq!(
            env.get(&tok("missing")),
            Err("Undefined variable \"missing\".".to_string())
        );
    }

    #[test]
    fn test_child_sees_parent_binding() {
        let parent = Environment::global();
        parent.define("a", Value::Number(1.0));
        let child = Environment::with_enclosing(&parent);
        assert_eq!(child.get(&tok("a")), Ok(Value::Number(1.0)));
    }

    #[test]
    fn test_assign_in_parent_visible_through_child() {
        let parent = Environment::global();
        parent.define("a", Value::Number(1.0));
        let child = Environment::with_enclosing(&parent);
        child.assign(&tok("a"), Value::Number(2.0)).unwrap();
        assert_eq!(parent.get(&tok("a")), Ok(Value::Number(2.0)));
    }

    #[test]
    fn test_assign_undefined_does_not_create_global() {
        let env = Environment::global();
        assert!(env.assign(&tok("missing"), Value::Number(1.0)).is_err());
        assert!(env.get(&tok("missing")).is_err());
    }

    #[test]
    fn test_shadowing_redefine_in_same_frame() {
        let env = Environment::global();
        env.define("a", Value::Number(1.0));
        env.define("a", Value::Number(2.0));
        assert_eq!(env.get(&tok("a")), Ok(Value::Number(2.0)));
    }
}
