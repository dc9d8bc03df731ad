use crate::value::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NameError {
    #[error("Variable '{0}' is already declared")]
    AlreadyDeclared(String),
    #[error("Undefined variable '{0}'")]
    Undeclared(String),
}

/// The single flat variable store for one program run.
///
/// There are no nested scopes: a name declared inside a loop or conditional
/// body stays visible, with its last value, for the rest of the program.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), NameError> {
        if self.values.contains_key(name) {
            return Err(NameError::AlreadyDeclared(name.to_string()));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), NameError> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(NameError::Undeclared(name.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Value, NameError> {
        self.values
            .get(name)
            .ok_or_else(|| NameError::Undeclared(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_then_assign_then_get() {
        let mut env = Environment::new();
        env.declare("x", Value::Number(1.0)).unwrap();
        env.assign("x", Value::Number(2.0)).unwrap();
        assert_eq!(env.get("x"), Ok(&Value::Number(2.0)));
    }

    #[test]
    fn redeclaration_is_rejected() {
        let mut env = Environment::new();
        env.declare("x", Value::Number(1.0)).unwrap();
        assert_eq!(
            env.declare("x", Value::Number(3.0)),
            Err(NameError::AlreadyDeclared("x".to_string()))
        );
        assert_eq!(env.get("x"), Ok(&Value::Number(1.0)));
    }

    #[test]
    fn undeclared_names_fail_on_assign_and_get() {
        let mut env = Environment::new();
        assert!(!env.contains("y"));
        assert_eq!(
            env.assign("y", Value::Boolean(true)),
            Err(NameError::Undeclared("y".to_string()))
        );
        assert_eq!(
            env.get("y").unwrap_err().to_string(),
            "Undefined variable 'y'"
        );
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut env = Environment::new();
        env.declare("abc", Value::Number(1.0)).unwrap();
        env.declare("ABC", Value::Number(2.0)).unwrap();
        assert_eq!(env.get("abc"), Ok(&Value::Number(1.0)));
    }
}
