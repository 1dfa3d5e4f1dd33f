//! Parameter validation
//!
//! Open policy: only the keys a caller supplied are checked. Declared
//! parameters missing from the body are allowed.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::schema::{ParameterSchema, ValueType};

/// Check `body` against `schema`, stopping at the first offending key.
///
/// Keys are visited in the body map's order, which is sorted by name.
pub fn validate(schema: &ParameterSchema, body: &Map<String, Value>) -> Result<(), ValidationError> {
    for (name, value) in body {
        let Some(declared) = schema.get(name) else {
            return Err(ValidationError::UnknownParameter(name.clone()));
        };

        let expected = declared.value_type();
        let actual = ValueType::of(value);
        if expected != actual {
            return Err(ValidationError::TypeMismatch {
                name: name.clone(),
                expected,
                actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypedValue;
    use serde_json::json;

    fn hello_schema() -> ParameterSchema {
        [
            ("name".to_string(), TypedValue::String(String::new())),
            ("count".to_string(), TypedValue::Integer(0)),
            ("ratio".to_string(), TypedValue::Float(1.0)),
            ("loud".to_string(), TypedValue::Bool(false)),
            ("tags".to_string(), TypedValue::Opaque(json!([]))),
        ]
        .into_iter()
        .collect()
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_matching_body_passes() {
        let b = body(json!({"name": "Ada", "count": 3, "ratio": 0.25, "loud": true, "tags": ["x"]}));
        assert_eq!(validate(&hello_schema(), &b), Ok(()));
    }

    #[test]
    fn test_empty_and_partial_bodies_pass() {
        assert_eq!(validate(&hello_schema(), &Map::new()), Ok(()));
        assert_eq!(validate(&hello_schema(), &body(json!({"count": 7}))), Ok(()));
        assert_eq!(validate(&ParameterSchema::default(), &Map::new()), Ok(()));
    }

    #[test]
    fn test_unknown_parameter() {
        let err = validate(&hello_schema(), &body(json!({"age": 10}))).unwrap_err();
        assert_eq!(err, ValidationError::UnknownParameter("age".to_string()));
        assert_eq!(err.to_string(), "Incorrect parameter [age]");
    }

    #[test]
    fn test_type_mismatch() {
        let err = validate(&hello_schema(), &body(json!({"name": 5}))).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                name: "name".to_string(),
                expected: ValueType::String,
                actual: ValueType::Integer,
            }
        );
        assert_eq!(
            err.to_string(),
            "The value of [name] should be type [string] not [integer]"
        );
    }

    #[test]
    fn test_no_numeric_coercion() {
        let err = validate(&hello_schema(), &body(json!({"count": 3.0}))).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TypeMismatch { expected: ValueType::Integer, actual: ValueType::Float, .. }
        ));

        let err = validate(&hello_schema(), &body(json!({"ratio": 2}))).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TypeMismatch { expected: ValueType::Float, actual: ValueType::Integer, .. }
        ));

        let err = validate(&hello_schema(), &body(json!({"loud": "true"}))).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TypeMismatch { expected: ValueType::Boolean, actual: ValueType::String, .. }
        ));
    }

    #[test]
    fn test_null_is_not_a_string() {
        let err = validate(&hello_schema(), &body(json!({"name": null}))).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TypeMismatch { actual: ValueType::Null, .. }
        ));
    }

    #[test]
    fn test_first_offending_key_in_name_order() {
        let b = body(json!({"zeta": 1, "alpha": 2, "count": "x"}));
        let err = validate(&hello_schema(), &b).unwrap_err();
        assert_eq!(err, ValidationError::UnknownParameter("alpha".to_string()));
    }
}
