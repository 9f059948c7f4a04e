use serde::{Deserialize, Serialize};

/// Runtime value on the machine's operand stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit floating-point number.
    Number(f64),

    /// UTF-8 string value.
    Str(String),

    /// Boolean value.
    Bool(bool),

    /// The null value.
    Null,

    /// Reference to a compiled function: entry address plus arity.
    Function { address: usize, arity: usize },
}

impl Value {
    /// Truthiness: `false`, `null`, `0` and the empty string are falsy,
    /// every other value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Function { .. } => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
            Value::Function { .. } => "function",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => {
                // Whole numbers print without a fractional part: 30, not 30.0.
                if n.fract() == 0.0 && n.is_finite() && n.abs() <= i64::MAX as f64 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Function { address, arity } => write!(f, "<function @{}/{}>", address, arity),
        }
    }
}
