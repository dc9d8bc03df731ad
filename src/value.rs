use std::fmt;

pub const TRUE_WORD: &str = "OO";
pub const FALSE_WORD: &str = "DILI";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    Character(char),
}

/// Why a coercion failed. The evaluator attaches the source location.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionError {
    pub expected: &'static str,
    pub found: Value,
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Expected {}, found {} '{}'",
            self.expected,
            self.found.type_name(),
            self.found
        )
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Character(_) => "character",
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, Value::Text(_) | Value::Character(_))
    }

    pub fn to_number(&self) -> Result<f64, CoercionError> {
        let number = match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Value::Character(c) => c.to_digit(10).map(f64::from),
            Value::Boolean(_) => None,
        };

        number.ok_or_else(|| CoercionError {
            expected: "a number",
            found: self.clone(),
        })
    }

    /// Booleans, plus text spelling one of the two boolean words.
    pub fn to_boolean(&self) -> Result<bool, CoercionError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::Text(s) if s == TRUE_WORD => Ok(true),
            Value::Text(s) if s == FALSE_WORD => Ok(false),
            _ => Err(CoercionError {
                expected: "a boolean (OO or DILI)",
                found: self.clone(),
            }),
        }
    }

    /// Text rendering used by `IPAKITA`.
    pub fn to_display(&self) -> String {
        self.to_string()
    }

    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Boolean(l), Value::Boolean(r)) => l == r,
            (l, r) => l.to_display() == r.to_display(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if *n == 0.0 {
                    // Covers -0 as well.
                    write!(f, "0")
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", if *b { TRUE_WORD } else { FALSE_WORD }),
            Value::Character(c) => write!(f, "{}", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_display_without_trailing_fraction() {
        assert_eq!(Value::Number(4.0).to_string(), "4");
        assert_eq!(Value::Number(-60.0).to_string(), "-60");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(5.0 / 3.0).to_string(), "1.6666666666666667");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
    }

    #[test]
    fn booleans_display_as_words() {
        assert_eq!(Value::Boolean(true).to_string(), "OO");
        assert_eq!(Value::Boolean(false).to_string(), "DILI");
    }

    #[test]
    fn to_number_coerces_numeric_text_and_digits() {
        assert_eq!(Value::Text(" 12 ".into()).to_number(), Ok(12.0));
        assert_eq!(Value::Character('7').to_number(), Ok(7.0));
        assert!(Value::Text("abc".into()).to_number().is_err());
        assert!(Value::Boolean(true).to_number().is_err());
    }

    #[test]
    fn to_boolean_accepts_boolean_words() {
        assert_eq!(Value::Text("OO".into()).to_boolean(), Ok(true));
        assert_eq!(Value::Text("DILI".into()).to_boolean(), Ok(false));
        let error = Value::Number(1.0).to_boolean().unwrap_err();
        assert_eq!(error.to_string(), "Expected a boolean (OO or DILI), found number '1'");
    }

    #[test]
    fn loose_equality_compares_display_forms_across_kinds() {
        assert!(Value::Boolean(true).loose_eq(&Value::Text("OO".into())));
        assert!(Value::Number(4.0).loose_eq(&Value::Text("4".into())));
        assert!(Value::Character('c').loose_eq(&Value::Text("c".into())));
        assert!(!Value::Number(4.0).loose_eq(&Value::Number(5.0)));
    }
}
