//! Flattening of loosely-typed LLM JSON fields.
//!
//! Completion services return `inference`, `premise`, `evidence_used` and
//! similar fields as strings, lists or objects interchangeably. Every parser
//! in the LLM-hybrid strategy goes through these helpers.

use serde_json::Value;

use crate::engine::clamp_confidence;

/// Render any JSON value as display text.
///
/// Lists are joined with `"; "` (objects inside them serialized as JSON),
/// objects are serialized as JSON, null is empty.
pub fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) => item.to_string(),
                other => coerce_to_text(other),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => value.to_string(),
    }
}

/// Render any JSON value as a list of display strings.
///
/// A string becomes a single-element list; null and empty strings become an
/// empty list.
pub fn coerce_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) => item.to_string(),
                other => coerce_to_text(other),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        other => vec![coerce_to_text(other)],
    }
}

/// Field of `object` as text, or `None` when absent, null or empty.
pub fn field_text(object: &Value, key: &str) -> Option<String> {
    object
        .get(key)
        .map(coerce_to_text)
        .filter(|s| !s.trim().is_empty())
}

/// Field of `object` as a list of strings (empty when absent).
pub fn field_list(object: &Value, key: &str) -> Vec<String> {
    object.get(key).map(coerce_to_list).unwrap_or_default()
}

/// Numeric confidence field, clamped; `default` when absent or not a number.
pub fn field_confidence(object: &Value, key: &str, default: f64) -> f64 {
    let raw = match object.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    clamp_confidence(raw.unwrap_or(default))
}

/// Boolean field, accepting `true`/`false` strings in French or English.
pub fn field_bool(object: &Value, key: &str) -> Option<bool> {
    match object.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "vrai" | "oui" | "yes" => Some(true),
            "false" | "faux" | "non" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_to_text_variants() {
        assert_eq!(coerce_to_text(&json!("Dupont est suspect")), "Dupont est suspect");
        assert_eq!(coerce_to_text(&json!(["a", "b"])), "a; b");
        assert_eq!(
            coerce_to_text(&json!(["a", {"k": "v"}])),
            r#"a; {"k":"v"}"#
        );
        assert_eq!(coerce_to_text(&json!({"k": 1})), r#"{"k":1}"#);
        assert_eq!(coerce_to_text(&json!(0.5)), "0.5");
        assert_eq!(coerce_to_text(&Value::Null), "");
    }

    #[test]
    fn test_coerce_to_list_variants() {
        assert_eq!(coerce_to_list(&json!("e1")), vec!["e1"]);
        assert_eq!(coerce_to_list(&json!(["e1", 2, {"id": "e3"}])), vec!["e1", "2", r#"{"id":"e3"}"#]);
        assert!(coerce_to_list(&json!("")).is_empty());
        assert!(coerce_to_list(&Value::Null).is_empty());
        assert_eq!(coerce_to_list(&json!({"id": "e4"})), vec![r#"{"id":"e4"}"#]);
    }

    #[test]
    fn test_field_confidence() {
        let object = json!({"a": 0.8, "b": 1.5, "c": "0.3", "d": "élevée", "f": -1});
        assert_eq!(field_confidence(&object, "a", 0.5), 0.8);
        assert_eq!(field_confidence(&object, "b", 0.5), 1.0);
        assert_eq!(field_confidence(&object, "c", 0.5), 0.3);
        assert_eq!(field_confidence(&object, "d", 0.5), 0.5);
        assert_eq!(field_confidence(&object, "f", 0.5), 0.0);
        assert_eq!(field_confidence(&object, "missing", 0.7), 0.7);
    }

    #[test]
    fn test_field_bool_and_text() {
        let object = json!({"a": true, "b": "Oui", "c": 3, "t": "  ", "u": ["x"]});
        assert_eq!(field_bool(&object, "a"), Some(true));
        assert_eq!(field_bool(&object, "b"), Some(true));
        assert_eq!(field_bool(&object, "c"), None);
        assert_eq!(field_bool(&object, "missing"), None);
        assert_eq!(field_text(&object, "t"), None);
        assert_eq!(field_text(&object, "u").as_deref(), Some("x"));
    }
}
