//! Response parsing: best-effort extraction of a JSON object from raw
//! backend text.
//!
//! Completion backends are instructed to emit bare JSON, but in practice the
//! reply may arrive wrapped in commentary, backticks, or a ```json fence.
//! The extraction contract is deliberately simple and tested on its own:
//! strip an outer fence if present, then take the substring from the first
//! `{` to the last `}`. Anything else is a [`ParseError`] — which is
//! non-fatal to the request; the affected question degrades to an empty
//! answer.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// A backend reply that could not be turned into answers.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// No `{ … }` pair found in the reply.
    #[error("no JSON object found in reply")]
    NoJsonObject,
    /// The bracketed substring was not valid JSON of the expected shape.
    #[error("malformed answer JSON: {0}")]
    BadJson(String),
}

/// One answer from a batched reply, tagged with its question index.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct AnswerFragment {
    /// Question index echoed back by the backend.
    pub ques: usize,
    /// Answer text (possibly the sentinel).
    pub ans: String,
}

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").unwrap());

/// Extract the JSON-object substring from a raw backend reply.
///
/// Contract: trim, strip one outer code fence if the whole reply is fenced,
/// then return the substring from the first `{` to the last `}` inclusive.
/// Returns `None` when either bracket is absent.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let inner = match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(trimmed),
        None => trimmed,
    };

    let start = inner.find('{')?;
    let end = inner.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&inner[start..=end])
}

/// Parse a per-question reply: `{"ans": "..."}`.
pub fn parse_single(raw: &str) -> Result<String, ParseError> {
    #[derive(Deserialize)]
    struct SingleReply {
        ans: String,
    }

    let json = extract_json_object(raw).ok_or(ParseError::NoJsonObject)?;
    let reply: SingleReply =
        serde_json::from_str(json).map_err(|e| ParseError::BadJson(e.to_string()))?;
    Ok(reply.ans)
}

/// Parse a batched reply: `{"answers": [{"ques": i, "ans": "..."}, …]}`.
pub fn parse_batch(raw: &str) -> Result<Vec<AnswerFragment>, ParseError> {
    #[derive(Deserialize)]
    struct BatchReply {
        answers: Vec<AnswerFragment>,
    }

    let json = extract_json_object(raw).ok_or(ParseError::NoJsonObject)?;
    let reply: BatchReply =
        serde_json::from_str(json).map_err(|e| ParseError::BadJson(e.to_string()))?;
    Ok(reply.answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_object() {
        assert_eq!(extract_json_object(r#"{"ans":"x"}"#), Some(r#"{"ans":"x"}"#));
    }

    #[test]
    fn extracts_object_with_commentary() {
        let raw = r#"Sure! Here is the answer: {"ans":"1990"} Hope that helps."#;
        assert_eq!(extract_json_object(raw), Some(r#"{"ans":"1990"}"#));
    }

    #[test]
    fn extracts_object_inside_fence() {
        let raw = "```json\n{\"ans\":\"1990\"}\n```";
        assert_eq!(extract_json_object(raw), Some(r#"{"ans":"1990"}"#));
    }

    #[test]
    fn no_braces_is_none() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object(""), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn parse_single_happy_path() {
        assert_eq!(parse_single(r#"{"ans":"1990"}"#).unwrap(), "1990");
    }

    #[test]
    fn parse_single_missing_key_fails() {
        let err = parse_single(r#"{"answer":"1990"}"#).unwrap_err();
        assert!(matches!(err, ParseError::BadJson(_)));
    }

    #[test]
    fn parse_single_wrong_type_fails() {
        let err = parse_single(r#"{"ans":1990}"#).unwrap_err();
        assert!(matches!(err, ParseError::BadJson(_)));
    }

    #[test]
    fn parse_single_no_object_fails() {
        let err = parse_single("I could not find anything.").unwrap_err();
        assert!(matches!(err, ParseError::NoJsonObject));
    }

    #[test]
    fn parse_batch_roundtrip() {
        let fragments = vec![
            AnswerFragment {
                ques: 0,
                ans: "1990".into(),
            },
            AnswerFragment {
                ques: 3,
                ans: "Not available in document.".into(),
            },
        ];
        let encoded =
            serde_json::to_string(&serde_json::json!({ "answers": fragments })).unwrap();
        let decoded = parse_batch(&encoded).unwrap();
        assert_eq!(decoded, fragments);
    }

    #[test]
    fn parse_batch_tolerates_surrounding_prose() {
        let raw = "Here you go:\n{\"answers\":[{\"ques\":2,\"ans\":\"blue\"}]}\nDone.";
        let decoded = parse_batch(raw).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].ques, 2);
    }

    #[test]
    fn parse_batch_wrong_shape_fails() {
        assert!(parse_batch(r#"{"answers":"nope"}"#).is_err());
        assert!(parse_batch(r#"{"ans":"x"}"#).is_err());
    }
}
