//! JSON output for compiled filter documents.
//!
//! Conversion targets [`serde_json::Value`] so a filter can be embedded in a
//! larger JSON payload; the string helpers cover the common case of printing
//! one document. Key order follows the document's insertion order, which the
//! compiler keeps deterministic.
//!
//! Regex values render in query syntax, `{"$regex": "...", "$options": "i"}`,
//! with `$options` omitted when the pattern carries no flags.
//!
//! # Examples
//!
//! ```
//! use mongoexpr::{Compiler, output::to_json};
//!
//! let compiler = Compiler::new();
//! let filter = compiler.compile("a > 3").unwrap();
//!
//! assert_eq!(to_json(&filter), r#"{"a":{"$gt":3}}"#);
//! ```

use crate::value::{Document, Value};

/// Convert a filter Value to serde_json::Value
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Pattern(pattern) => {
            let mut obj = serde_json::Map::new();
            obj.insert(
                "$regex".to_string(),
                serde_json::Value::String(pattern.source.clone()),
            );
            if !pattern.flags.is_empty() {
                obj.insert(
                    "$options".to_string(),
                    serde_json::Value::String(pattern.flags.clone()),
                );
            }
            serde_json::Value::Object(obj)
        }
        Value::Array(arr) => serde_json::Value::Array(arr.iter().map(value_to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert a filter document to serde_json::Value
pub fn document_to_json(doc: &Document) -> serde_json::Value {
    serde_json::Value::Object(
        doc.iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect(),
    )
}

/// Render a filter document as a compact JSON string
pub fn to_json(doc: &Document) -> String {
    document_to_json(doc).to_string()
}

/// Render a filter document as a pretty-printed JSON string
pub fn to_json_pretty(doc: &Document) -> String {
    format!("{:#}", document_to_json(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Pattern;
    use serde_json::json;

    #[test]
    fn test_pattern_renders_regex_and_options() {
        let v = Value::Pattern(Pattern::new("^c.*$", "i"));
        assert_eq!(
            value_to_json(&v),
            json!({"$regex": "^c.*$", "$options": "i"})
        );
    }

    #[test]
    fn test_pattern_without_flags_omits_options() {
        let v = Value::Pattern(Pattern::new("^c.*$", ""));
        assert_eq!(value_to_json(&v), json!({"$regex": "^c.*$"}));
    }

    #[test]
    fn test_non_finite_float_renders_as_null() {
        assert_eq!(value_to_json(&Value::Float(f64::NAN)), json!(null));
        assert_eq!(value_to_json(&Value::Float(f64::INFINITY)), json!(null));
    }

    #[test]
    fn test_document_key_order_is_preserved() {
        let mut doc = Document::new();
        doc.insert("b".to_string(), Value::Integer(1));
        doc.insert("a".to_string(), Value::Integer(2));
        assert_eq!(to_json(&doc), r#"{"b":1,"a":2}"#);
    }
}
