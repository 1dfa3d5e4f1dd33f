//! Typed parameter values
//!
//! Schema defaults are classified once at load time into a closed set of
//! variants. Request values are only ever compared by their `ValueType`.

use serde_json::Value;
use std::fmt;

/// Runtime type of a JSON value as seen by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Float,
    String,
    Boolean,
    Null,
    Array,
    Object,
}

impl ValueType {
    /// Classify a JSON value. Numbers without a fractional or exponent part
    /// are integers, everything else numeric is a float.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Integer,
            Value::String(_) => Self::String,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared default value of a parameter, doubling as its type declaration
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
    /// null, array or object defaults; rendered with the JSON stringifier
    Opaque(Value),
}

impl TypedValue {
    /// Convert a JSON default. Returns `None` for integers outside `i64`.
    pub fn from_json(value: Value) -> Option<Self> {
        let typed = match value {
            Value::Number(n) if n.is_f64() => Self::Float(n.as_f64()?),
            Value::Number(n) => Self::Integer(n.as_i64()?),
            Value::String(s) => Self::String(s),
            Value::Bool(b) => Self::Bool(b),
            other => Self::Opaque(other),
        };
        Some(typed)
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Bool(_) => ValueType::Boolean,
            Self::Opaque(v) => ValueType::of(v),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::String(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Opaque(v) => v.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_type_numbers() {
        assert_eq!(ValueType::of(&json!(3)), ValueType::Integer);
        assert_eq!(ValueType::of(&json!(-3)), ValueType::Integer);
        assert_eq!(ValueType::of(&json!(u64::MAX)), ValueType::Integer);
        assert_eq!(ValueType::of(&json!(3.0)), ValueType::Float);
        assert_eq!(ValueType::of(&json!(0.5)), ValueType::Float);
    }

    #[test]
    fn test_value_type_other_kinds() {
        assert_eq!(ValueType::of(&json!("x")), ValueType::String);
        assert_eq!(ValueType::of(&json!(false)), ValueType::Boolean);
        assert_eq!(ValueType::of(&json!(null)), ValueType::Null);
        assert_eq!(ValueType::of(&json!([1])), ValueType::Array);
        assert_eq!(ValueType::of(&json!({"a": 1})), ValueType::Object);
    }

    #[test]
    fn test_typed_value_from_json() {
        assert_eq!(TypedValue::from_json(json!(0)), Some(TypedValue::Integer(0)));
        assert_eq!(TypedValue::from_json(json!(1.5)), Some(TypedValue::Float(1.5)));
        assert_eq!(
            TypedValue::from_json(json!("")),
            Some(TypedValue::String(String::new()))
        );
        assert_eq!(TypedValue::from_json(json!(true)), Some(TypedValue::Bool(true)));
        assert_eq!(
            TypedValue::from_json(json!(["a"])),
            Some(TypedValue::Opaque(json!(["a"])))
        );
        assert_eq!(TypedValue::from_json(json!(u64::MAX)), None);
    }

    #[test]
    fn test_typed_value_type_matches_json_classification() {
        for v in [json!(1), json!(1.25), json!("s"), json!(true), json!(null), json!({})] {
            let typed = TypedValue::from_json(v.clone()).unwrap();
            assert_eq!(typed.value_type(), ValueType::of(&v));
            assert_eq!(typed.to_json(), v);
        }
    }
}
