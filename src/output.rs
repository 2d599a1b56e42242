//! Output types: per-question results, document metadata, and run statistics.
//!
//! [`QaOutput`] is the "everything we know" result. Most callers only need
//! `output.answers` — an ordered list of strings, one per input question —
//! but the per-question [`AnswerResult`] records and [`QaStats`] are kept so
//! callers can inspect partial failures, retries, and timings without
//! re-running the request.

use crate::error::QuestionError;
use serde::{Deserialize, Serialize};

/// Result of answering one question.
///
/// Always produced, even on failure — a failed question carries an empty
/// `answer` and a populated `error` (the analog of a failed page in a
/// page-oriented pipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Zero-based position of the question in the inbound list.
    pub index: usize,
    /// The answer string; empty when the question failed or was empty.
    pub answer: String,
    /// Retries consumed by the completion call (0 = first attempt worked).
    pub retries: u32,
    /// Wall-clock time spent on this question, in milliseconds.
    pub duration_ms: u64,
    /// Present when the question degraded to an empty answer.
    pub error: Option<QuestionError>,
}

impl AnswerResult {
    /// An empty result for a question that was never sent to the backend
    /// (blank question text, or sweep mode bookkeeping).
    pub(crate) fn empty(index: usize) -> Self {
        Self {
            index,
            answer: String::new(),
            retries: 0,
            duration_ms: 0,
            error: None,
        }
    }
}

/// Incidental metadata about the document the questions were answered from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// The URL or path the document was fetched from.
    pub source: String,
    /// Length of the extracted plain text, in bytes.
    pub text_len: usize,
    /// Number of retrieval chunks the text was split into.
    pub chunk_count: usize,
}

/// Statistics for one question-answering run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaStats {
    /// Total questions in the request.
    pub total_questions: usize,
    /// Questions that resolved to a non-empty answer.
    pub answered: usize,
    /// Questions that degraded to an empty answer.
    pub unanswered: usize,
    /// Document sweeps performed (0 in per-question mode).
    pub sweeps: u32,
    /// Total completion-call retries across all questions.
    pub total_retries: u32,
    /// End-to-end wall-clock time, in milliseconds.
    pub total_duration_ms: u64,
    /// Time spent fetching and extracting the document, in milliseconds.
    pub fetch_duration_ms: u64,
    /// Time spent in completion calls (including retries), in milliseconds.
    pub llm_duration_ms: u64,
}

/// Complete output of a question-answering run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaOutput {
    /// Ordered answers, exactly one per inbound question. Slots with no
    /// resolved answer are empty strings, never absent.
    pub answers: Vec<String>,
    /// Per-question detail, sorted by question index.
    pub results: Vec<AnswerResult>,
    /// Document metadata.
    pub metadata: DocumentMetadata,
    /// Run statistics.
    pub stats: QaStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_serialises_to_json() {
        let output = QaOutput {
            answers: vec!["1990".into(), String::new()],
            results: vec![AnswerResult::empty(0), AnswerResult::empty(1)],
            metadata: DocumentMetadata {
                source: "doc.pdf".into(),
                text_len: 42,
                chunk_count: 1,
            },
            stats: QaStats {
                total_questions: 2,
                answered: 1,
                unanswered: 1,
                ..Default::default()
            },
        };

        let json = serde_json::to_string(&output).unwrap();
        let back: QaOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.answers, output.answers);
        assert_eq!(back.stats.total_questions, 2);
    }
}
