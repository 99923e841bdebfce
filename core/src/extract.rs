use serde_json::Value;
use tracing::debug;

use crate::types::SparkFields;

/// Best-effort recovery of `{spark, focus}` from model output.
///
/// Tries a strict parse of the whole text, then of the span from the first
/// `{` to the last `}`. `None` means nothing usable was found, which is not
/// the same as a parsed object with empty fields.
pub fn extract_spark_fields(text: &str) -> Option<SparkFields> {
    if text.is_empty() {
        return None;
    }

    if let Some(fields) = parse_fields(text) {
        return Some(fields);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    let candidate = &text[start..=end];
    debug!(len = candidate.len(), "Retrying JSON parse on brace-delimited span");
    parse_fields(candidate)
}

fn parse_fields(text: &str) -> Option<SparkFields> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;
    Some(SparkFields {
        spark: string_field(object.get("spark"))?,
        focus: string_field(object.get("focus"))?,
    })
}

/// Absent and falsy values (`null`, `false`, `0`, `[]`, `{}`) read as empty;
/// any other non-string fails the parse.
fn string_field(value: Option<&Value>) -> Option<String> {
    match value {
        None => Some(String::new()),
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(value) if is_falsy(value) => Some(String::new()),
        Some(_) => None,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(spark: &str, focus: &str) -> Option<SparkFields> {
        Some(SparkFields {
            spark: spark.to_string(),
            focus: focus.to_string(),
        })
    }

    #[test]
    fn test_clean_json() {
        assert_eq!(
            extract_spark_fields(r#"{"spark":"a","focus":"b"}"#),
            fields("a", "b")
        );
    }

    #[test]
    fn test_surrounding_prose() {
        assert_eq!(
            extract_spark_fields(r#"noise {"spark":"a","focus":"b"} trailing"#),
            fields("a", "b")
        );
    }

    #[test]
    fn test_fenced_multiline_block() {
        let text = "Sure! Here you go:\n```json\n{\n  \"spark\": \" Breathe. \",\n  \"focus\": \"Walk.\"\n}\n```";
        assert_eq!(extract_spark_fields(text), fields("Breathe.", "Walk."));
    }

    #[test]
    fn test_no_braces_is_none() {
        assert_eq!(extract_spark_fields("just some words"), None);
        assert_eq!(extract_spark_fields(""), None);
    }

    #[test]
    fn test_missing_fields_are_empty_not_none() {
        assert_eq!(extract_spark_fields(r#"{"spark":"only"}"#), fields("only", ""));
        assert_eq!(extract_spark_fields(r#"{"spark":null}"#), fields("", ""));
        assert_eq!(extract_spark_fields("{}"), fields("", ""));
    }

    #[test]
    fn test_greedy_span_covering_two_objects_fails() {
        assert_eq!(
            extract_spark_fields(r#"{"spark":"a"} and {"focus":"b"}"#),
            None
        );
    }

    #[test]
    fn test_reversed_braces_is_none() {
        assert_eq!(extract_spark_fields("} nothing {"), None);
    }

    #[test]
    fn test_non_object_and_truthy_non_string_fields_fail() {
        assert_eq!(extract_spark_fields("[1, 2]"), None);
        assert_eq!(extract_spark_fields(r#"{"spark": 3, "focus": "b"}"#), None);
        assert_eq!(extract_spark_fields(r#"{"spark": true, "focus": "b"}"#), None);
        assert_eq!(extract_spark_fields(r#"{"spark": ["x"], "focus": "b"}"#), None);
    }

    #[test]
    fn test_falsy_fields_are_empty() {
        for falsy in ["false", "0", "0.0", "[]", "{}", "null"] {
            let text = format!(r#"{{"spark": {}, "focus": "b"}}"#, falsy);
            assert_eq!(extract_spark_fields(&text), fields("", "b"), "spark = {}", falsy);
        }
        assert_eq!(
            extract_spark_fields(r#"{"spark": "a", "focus": false}"#),
            fields("a", "")
        );
    }
}
