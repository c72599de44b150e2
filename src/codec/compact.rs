//! Compact `@{key=value; ...}` node references.
//!
//! Compendium content sometimes embeds a node as a single string instead of
//! an object. Values are coerced: `null`, `true`/`false`, anything that
//! parses fully as a number, and otherwise a string. Strings without the
//! `@{...}` wrapper are not references and yield `None`.

use serde_json::{Map, Number, Value};

/// Parse a compact reference into a JSON object.
///
/// ```
/// use ability_effects::codec::parse_compact;
/// use serde_json::json;
///
/// let fields = parse_compact("@{type=savingThrow; savingThrowType=will; saveDC=-2.5}").unwrap();
/// assert_eq!(fields["saveDC"], json!(-2.5));
/// assert!(parse_compact("type=condition").is_none());
/// ```
#[must_use]
pub fn parse_compact(encoded: &str) -> Option<Map<String, Value>> {
    let inner = encoded.trim().strip_prefix("@{")?.strip_suffix('}')?;

    let fields = inner
        .split(';')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), coerce_value(value.trim())))
        })
        .collect();

    Some(fields)
}

/// Coerce one compact value token.
#[must_use]
pub fn coerce_value(token: &str) -> Value {
    match token {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => parse_number(token).unwrap_or_else(|| Value::String(token.to_string())),
    }
}

fn parse_number(token: &str) -> Option<Value> {
    if token.is_empty() {
        return None;
    }
    if let Ok(int) = token.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    // "inf" and "NaN" parse as floats but are words, not numbers.
    let float = token.parse::<f64>().ok().filter(|f| f.is_finite())?;
    Number::from_f64(float).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coercion() {
        assert_eq!(coerce_value("null"), Value::Null);
        assert_eq!(coerce_value("true"), json!(true));
        assert_eq!(coerce_value("false"), json!(false));
        assert_eq!(coerce_value("12"), json!(12));
        assert_eq!(coerce_value("-3"), json!(-3));
        assert_eq!(coerce_value("0.5"), json!(0.5));
        assert_eq!(coerce_value("2d6+3"), json!("2d6+3"));
        assert_eq!(coerce_value("1e3"), json!(1000.0));
        assert_eq!(coerce_value("inf"), json!("inf"));
        assert_eq!(coerce_value("NaN"), json!("NaN"));
        assert_eq!(coerce_value(""), json!(""));
        assert_eq!(coerce_value("True"), json!("True"));
    }

    #[test]
    fn test_parse_pairs() {
        let fields = parse_compact("@{type=condition; condition=prone}").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["type"], json!("condition"));
        assert_eq!(fields["condition"], json!("prone"));
    }

    #[test]
    fn test_whitespace_and_empty_pairs() {
        let fields = parse_compact("  @{ a = 1 ;; b=null; junk }  ").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["a"], json!(1));
        assert_eq!(fields["b"], Value::Null);
    }

    #[test]
    fn test_value_may_contain_equals() {
        let fields = parse_compact("@{text=a=b}").unwrap();
        assert_eq!(fields["text"], json!("a=b"));
    }

    #[test]
    fn test_malformed_wrapper() {
        assert!(parse_compact("{type=condition}").is_none());
        assert!(parse_compact("@{type=condition").is_none());
        assert!(parse_compact("").is_none());
    }
}
