//! Slot values

use serde::{Deserialize, Serialize};
use std::fmt;

/// A constant stored in a fact slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum Value {
    /// Bare symbol such as `yes` or `fever`
    Symbol(String),
    /// Double-quoted string
    String(String),
}

impl Value {
    /// The symbol assigned to slots that were not given a value
    pub fn nil() -> Self {
        Value::Symbol("nil".to_string())
    }

    /// Create a symbol value
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// Create a string value
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    /// Textual content without quoting
    pub fn as_str(&self) -> &str {
        match self {
            Value::Symbol(s) | Value::String(s) => s,
        }
    }

    /// Whether this is the `nil` symbol
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Symbol(s) if s == "nil")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Symbol(s) => f.write_str(s),
            Value::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("\"")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_strings() {
        assert_eq!(Value::symbol("yes").to_string(), "yes");
        assert_eq!(Value::string("say \"hi\"").to_string(), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_nil() {
        assert!(Value::nil().is_nil());
        assert!(!Value::string("nil").is_nil());
        assert_eq!(Value::string("text").as_str(), "text");
    }
}
