//! System prompts and payload builders for the completion backend.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the sentinel string and the JSON schemas
//!    the backend is asked to follow are referenced by the parser and the
//!    assembler too; one constant keeps them in lockstep.
//!
//! 2. **Testability** — unit tests can inspect prompts and payloads directly
//!    without spinning up a real backend.
//!
//! Callers can override the per-question prompt via
//! [`crate::config::QaConfig::system_prompt`]; the constants here are used
//! only when no override is provided.

use serde::Serialize;

/// The fixed string the backend must emit when the context does not contain
/// the answer. Never surfaced by the sweep assembler; passed through verbatim
/// in per-question mode.
pub const NOT_AVAILABLE: &str = "Not available in document.";

/// Default system prompt for per-question mode.
///
/// The backend must reply with a single JSON object `{"ans": "..."}` and
/// nothing else. Wording follows the production service this crate replaces.
pub const PER_QUESTION_SYSTEM_PROMPT: &str = r#"You are a precise document QA assistant. Given a document excerpt and a question, respond ONLY with valid JSON: {"ans":"<string>"}. If you cannot find the answer in the excerpt, return exactly "Not available in document." as the answer. No code fences or extra text."#;

/// Default system prompt for sweep (batched) mode.
///
/// The backend receives a numbered list of questions sharing one excerpt and
/// must reply with `{"answers":[{"ques":<index>,"ans":"<string>"}, ...]}`,
/// echoing each question's index unchanged.
pub const SWEEP_SYSTEM_PROMPT: &str = r#"You are a precise document QA assistant. Given a document excerpt and a numbered list of questions, respond ONLY with valid JSON: {"answers":[{"ques":<index>,"ans":"<string>"}, ...]}. Echo each question's index unchanged in "ques". If you cannot find the answer to a question in the excerpt, use exactly "Not available in document." as its answer. No code fences or extra text."#;

/// One entry of a sweep payload: a still-unanswered question plus the
/// excerpt it should be answered from.
#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    pub index: usize,
    pub question: String,
    pub context: String,
}

/// Build the user payload for a single question.
pub fn question_payload(context: &str, question: &str) -> String {
    serde_json::json!({
        "excerpt": context,
        "question": question,
    })
    .to_string()
}

/// Build the user payload for one sweep over the document.
pub fn sweep_payload(entries: &[SweepEntry]) -> String {
    serde_json::json!({ "questions": entries }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_mention_the_sentinel() {
        assert!(PER_QUESTION_SYSTEM_PROMPT.contains(NOT_AVAILABLE));
        assert!(SWEEP_SYSTEM_PROMPT.contains(NOT_AVAILABLE));
    }

    #[test]
    fn question_payload_is_valid_json() {
        let p = question_payload("some text", "what is it?");
        let v: serde_json::Value = serde_json::from_str(&p).unwrap();
        assert_eq!(v["excerpt"], "some text");
        assert_eq!(v["question"], "what is it?");
    }

    #[test]
    fn sweep_payload_carries_indices() {
        let entries = vec![
            SweepEntry {
                index: 0,
                question: "q0".into(),
                context: "ctx".into(),
            },
            SweepEntry {
                index: 4,
                question: "q4".into(),
                context: "ctx".into(),
            },
        ];
        let p = sweep_payload(&entries);
        let v: serde_json::Value = serde_json::from_str(&p).unwrap();
        assert_eq!(v["questions"][1]["index"], 4);
        assert_eq!(v["questions"][0]["question"], "q0");
    }
}
