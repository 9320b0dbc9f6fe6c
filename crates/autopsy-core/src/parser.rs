//! Best-effort JSON extraction from model output
//!
//! Models wrap their JSON in prose, code fences and apologies. The extractor
//! takes everything from the first `{` to the last `}` (spanning newlines) and
//! parses that span as a JSON object.
//!
//! Limitations: when a response holds several objects the span covers all of
//! them, which usually fails to parse. Braces inside surrounding prose widen
//! the span the same way. This is not a general JSON-in-text parser.

use crate::error::ClassificationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Parsed JSON object
pub type JsonObject = Map<String, Value>;

static JSON_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON span pattern is valid"));

/// Greedy first-`{`-to-last-`}` span of `text`
#[must_use]
pub fn extract_json_span(text: &str) -> Option<&str> {
    JSON_SPAN.find(text).map(|m| m.as_str())
}

/// Extract and parse the JSON object embedded in `text`
///
/// # Errors
/// - `ClassificationError::Extraction` if no `{...}` span exists
/// - `ClassificationError::Parse` if the span is not a valid JSON object
pub fn parse_response(text: &str) -> Result<JsonObject, ClassificationError> {
    let span = extract_json_span(text).ok_or(ClassificationError::Extraction)?;
    let object = serde_json::from_str::<JsonObject>(span)?;
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_bare_object() {
        let obj = parse_response(r#"{"incident_id": "a", "confidence": 0.5}"#).unwrap();
        assert_eq!(obj["incident_id"], "a");
        assert_eq!(obj["confidence"], 0.5);
    }

    #[test]
    fn parses_object_wrapped_in_prose() {
        let raw = "Sure! Here is the classification:\n```json\n{\n  \"incident_id\": \"incident_001\",\n  \"failure_type\": \"Hallucination\"\n}\n```\nLet me know if you need more.";
        let obj = parse_response(raw).unwrap();
        assert_eq!(obj["failure_type"], "Hallucination");
    }

    #[test]
    fn missing_braces_is_extraction_error() {
        assert!(matches!(
            parse_response("I could not classify this incident."),
            Err(ClassificationError::Extraction)
        ));
        assert!(matches!(parse_response("{ never closed"), Err(ClassificationError::Extraction)));
        assert!(matches!(parse_response("} backwards {"), Err(ClassificationError::Extraction)));
        assert!(matches!(parse_response(""), Err(ClassificationError::Extraction)));
    }

    #[test]
    fn invalid_span_is_parse_error() {
        assert!(matches!(
            parse_response(r#"{"incident_id": "a", "confidence": }"#),
            Err(ClassificationError::Parse(_))
        ));
    }

    #[test]
    fn multiple_objects_merge_into_one_span() {
        let raw = r#"first {"a": 1} then {"b": 2} done"#;
        assert_eq!(extract_json_span(raw), Some(r#"{"a": 1} then {"b": 2}"#));
        assert!(matches!(parse_response(raw), Err(ClassificationError::Parse(_))));
    }

    #[test]
    fn nested_objects_are_kept_whole() {
        let obj = parse_response(r#"result: {"outer": {"inner": true}} ok"#).unwrap();
        assert_eq!(obj["outer"]["inner"], true);
    }

    proptest! {
        #[test]
        fn object_is_found_regardless_of_prose(
            prefix in "[^{}]{0,40}",
            suffix in "[^{}]{0,40}",
            id in "[a-z0-9_]{1,12}",
            confidence in 0.0f64..=1.0,
        ) {
            let json = serde_json::json!({"incident_id": id, "confidence": confidence});
            let raw = format!("{prefix}{json}{suffix}");
            let obj = parse_response(&raw).unwrap();
            prop_assert_eq!(obj["incident_id"].as_str(), Some(id.as_str()));
        }

        #[test]
        fn text_without_open_brace_never_extracts(text in "[^{]{0,80}") {
            prop_assert!(matches!(parse_response(&text), Err(ClassificationError::Extraction)));
        }
    }
}
