//! Command translation
//!
//! Turns a matched route and a validated body into the argument list of the
//! external command: `-endpoint=<route> -method=<VERB> -<name>=<value> ...`

use hyper::Method;
use serde_json::{Map, Value};

use crate::schema::RouteSpec;

/// Build the argument list for one request.
///
/// The route and method selectors always come first. Body parameters follow
/// in the iteration order of `body`; callers must not rely on that order.
pub fn translate(spec: &RouteSpec, method: &Method, body: &Map<String, Value>) -> Vec<String> {
    let mut args = Vec::with_capacity(body.len() + 2);
    args.push(format!("-endpoint={}", spec.name));
    args.push(format!("-method={method}"));
    args.extend(
        body.iter()
            .map(|(name, value)| format!("-{name}={}", render_value(value))),
    );
    args
}

/// Canonical text of a parameter value on the command line
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ParameterSchema, TypedValue};
    use serde_json::json;

    fn hello_post() -> RouteSpec {
        RouteSpec {
            name: "hello".to_string(),
            path: "/hello".to_string(),
            method: Method::POST,
            schema: [
                ("name".to_string(), TypedValue::String(String::new())),
                ("count".to_string(), TypedValue::Integer(0)),
            ]
            .into_iter()
            .collect::<ParameterSchema>(),
        }
    }

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    /// Split a `-name=value` flag back into its parts
    fn parse_flag(arg: &str) -> Option<(&str, &str)> {
        arg.strip_prefix('-')?.split_once('=')
    }

    #[test]
    fn test_selectors_come_first() {
        let args = translate(&hello_post(), &Method::POST, &Map::new());
        assert_eq!(args, vec!["-endpoint=hello", "-method=POST"]);
    }

    #[test]
    fn test_hello_scenario_flags() {
        let body = as_map(json!({"name": "Ada", "count": 3}));
        let args = translate(&hello_post(), &Method::POST, &body);
        assert_eq!(args.len(), 4);
        assert_eq!(&args[..2], ["-endpoint=hello", "-method=POST"]);
        assert!(args.contains(&"-name=Ada".to_string()));
        assert!(args.contains(&"-count=3".to_string()));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("with space")), "with space");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(-7)), "-7");
        assert_eq!(render_value(&json!(2.5)), "2.5");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!(false)), "false");
        assert_eq!(render_value(&json!(null)), "null");
        assert_eq!(render_value(&json!([1, "a"])), r#"[1,"a"]"#);
        assert_eq!(render_value(&json!({"k": 1})), r#"{"k":1}"#);
    }

    #[test]
    fn test_flags_parse_back_to_body() {
        let body = as_map(json!({
            "name": "a=b c",
            "count": 12,
            "ratio": 0.125,
            "loud": true,
        }));
        let args = translate(&hello_post(), &Method::POST, &body);

        let parsed: Vec<(&str, &str)> = args[2..].iter().filter_map(|a| parse_flag(a)).collect();
        assert_eq!(parsed.len(), body.len());
        for (name, text) in parsed {
            assert_eq!(render_value(&body[name]), text);
        }
    }
}
