//! Analyzer response parsing
//!
//! Accepted shapes, optionally wrapped in a ```` ```json ```` fence:
//! - a JSON array of verdict objects (the shape the instructions ask for)
//! - a single verdict object
//! - an object with exactly one field holding such an array, which is what
//!   JSON-object response modes tend to produce

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use shared_types::StandardVerdict;

lazy_static! {
    /// Fenced code block, optionally labeled json
    static ref JSON_FENCE: Regex =
        Regex::new(r"(?s)^\s*```(?i:json)?[ \t]*\r?\n?(.*?)```\s*$").unwrap();
}

/// Result of interpreting one analyzer response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(Vec<StandardVerdict>),
    Unparseable { raw: String, reason: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseShape {
    List(Vec<StandardVerdict>),
    Single(StandardVerdict),
    Wrapped(BTreeMap<String, Vec<StandardVerdict>>),
}

/// Remove a surrounding code fence, if any.
pub fn strip_fence(raw: &str) -> &str {
    match JSON_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => raw.trim(),
    }
}

pub fn parse_response(raw: &str) -> ParseOutcome {
    let unparseable = |reason: String| ParseOutcome::Unparseable {
        raw: raw.to_string(),
        reason,
    };

    let body = strip_fence(raw);
    if body.is_empty() {
        return unparseable("empty response".to_string());
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return unparseable(format!("invalid JSON: {}", e)),
    };

    match serde_json::from_value::<ResponseShape>(value) {
        Ok(ResponseShape::List(verdicts)) => ParseOutcome::Parsed(verdicts),
        Ok(ResponseShape::Single(verdict)) => ParseOutcome::Parsed(vec![verdict]),
        Ok(ResponseShape::Wrapped(fields)) => {
            let count = fields.len();
            match fields.into_iter().next() {
                Some((_, verdicts)) if count == 1 => ParseOutcome::Parsed(verdicts),
                _ => unparseable(format!(
                    "expected a single array of verdicts, found {} fields",
                    count
                )),
            }
        }
        Err(_) => unparseable(
            "expected an array of {standard_name, is_compliant, content_description} objects"
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parsed(raw: &str) -> Vec<StandardVerdict> {
        match parse_response(raw) {
            ParseOutcome::Parsed(v) => v,
            ParseOutcome::Unparseable { reason, .. } => panic!("unexpected failure: {}", reason),
        }
    }

    fn reason(raw: &str) -> String {
        match parse_response(raw) {
            ParseOutcome::Unparseable { raw: kept, reason } => {
                assert_eq!(kept, raw);
                reason
            }
            ParseOutcome::Parsed(v) => panic!("unexpected success: {:?}", v),
        }
    }

    #[test]
    fn test_plain_array() {
        let verdicts = parsed(
            r#"[{"standard_name":"a","is_compliant":true,"content_description":"tag"},
                {"standard_name":"b","is_compliant":false,"content_description":""}]"#,
        );
        assert_eq!(
            verdicts,
            vec![
                StandardVerdict::new("a", true, "tag"),
                StandardVerdict::new("b", false, "")
            ]
        );
    }

    #[test]
    fn test_fenced_array() {
        let raw = "```json\n[{\"standard_name\":\"a\",\"is_compliant\":false,\"content_description\":\"x\"}]\n```";
        assert_eq!(parsed(raw), vec![StandardVerdict::new("a", false, "x")]);
    }

    #[test]
    fn test_fence_with_surrounding_whitespace() {
        let raw = "  ```JSON\n[]\n```  \n";
        assert_eq!(parsed(raw), vec![]);
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let verdicts = parsed(r#"[{"standard_name":"a","is_compliant":true}]"#);
        assert_eq!(verdicts[0].content_description, "");
    }

    #[test]
    fn test_single_object() {
        let verdicts = parsed(r#"{"standard_name":"a","is_compliant":true,"content_description":"ok"}"#);
        assert_eq!(verdicts.len(), 1);
    }

    #[test]
    fn test_wrapped_array() {
        let verdicts = parsed(
            r#"{"results":[{"standard_name":"a","is_compliant":true,"content_description":"ok"}]}"#,
        );
        assert_eq!(verdicts[0].standard_name, "a");
    }

    #[test]
    fn test_wrapped_with_several_fields_rejected() {
        let r = reason(r#"{"a":[],"b":[]}"#);
        assert!(r.contains("2 fields"));
    }

    #[test]
    fn test_invalid_json_keeps_raw_text() {
        let r = reason("I could not read this label.");
        assert!(r.starts_with("invalid JSON"));
    }

    #[test]
    fn test_trailing_commas_rejected() {
        let r = reason(r#"[{"standard_name":"a","is_compliant":true,},]"#);
        assert!(r.starts_with("invalid JSON"));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        // Valid JSON that is not a verdict list fails on shape, not syntax
        for raw in [
            r#"[{"standard":"a","compliant":"yes"}]"#,
            r#"[{"standard_name":"a","is_compliant":"true"}]"#,
            r#""compliant""#,
        ] {
            let r = reason(raw);
            assert!(r.starts_with("expected an array"), "{}: {}", raw, r);
        }

        let raw = "```json\n[{\"standard_name\":\"a\"}]\n```";
        assert!(matches!(
            parse_response(raw),
            ParseOutcome::Unparseable { raw: kept, .. } if kept == raw
        ));
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(reason("```json\n```"), "empty response");
        assert_eq!(reason("   "), "empty response");
    }
}
