use std::cmp::Ordering;

use serde_json::{Number, Value};

/// `null`, `false`, `0` and `""` are falsy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Canonical text form used by templating and string builtins.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Value's Display is compact JSON.
        other => other.to_string(),
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Equality with ASCII case-insensitive strings and numeric comparison of
/// numbers regardless of integer/float representation.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.eq_ignore_ascii_case(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        _ => a == b,
    }
}

pub fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!truthy(&v), "{v} should be falsy");
        }
    }

    #[test]
    fn truthy_values() {
        for v in [json!(true), json!(-1), json!("0"), json!([]), json!({})] {
            assert!(truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn text_forms() {
        assert_eq!(to_text(&json!(null)), "");
        assert_eq!(to_text(&json!("x")), "x");
        assert_eq!(to_text(&json!(false)), "false");
        assert_eq!(to_text(&json!(42)), "42");
        assert_eq!(to_text(&json!(["a", 1])), r#"["a",1]"#);
        assert_eq!(to_text(&json!({"k": "v"})), r#"{"k":"v"}"#);
    }

    #[test]
    fn equality_rules() {
        assert!(loose_eq(&json!("Main"), &json!("main")));
        assert!(loose_eq(&json!(1), &json!(1.0)));
        assert!(!loose_eq(&json!("1"), &json!(1)));
        assert!(loose_eq(&json!(null), &json!(null)));
        assert!(!loose_eq(&json!(null), &json!("")));
    }
}
