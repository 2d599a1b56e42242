//! Error types for the pdfqa library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`QaError`] — **Fatal**: the request cannot proceed at all (malformed
//!   request, document could not be fetched or parsed, backend not
//!   configured). Returned as `Err(QaError)` from the top-level `answer*`
//!   functions. No partial answers accompany a fatal error.
//!
//! * [`QuestionError`] — **Non-fatal**: a single question failed (completion
//!   call exhausted its retries, reply was not parseable JSON) but the other
//!   questions are fine. Stored inside [`crate::output::AnswerResult`] so
//!   callers can inspect partial success; the affected slot in the answer
//!   list degrades to an empty string.
//!
//! The separation keeps the core guarantee cheap to uphold: every response
//! that reaches the caller has exactly one answer per question, and a fault
//! in one question never contaminates its neighbours.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfqa library.
///
/// Question-level failures use [`QuestionError`] and are stored in
/// [`crate::output::AnswerResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum QaError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// The inbound request is malformed. Reported before any external call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were fetched but do not start with the PDF magic number.
    #[error("Document is not a valid PDF: '{source_name}'\nFirst bytes: {magic:?}")]
    NotAPdf {
        source_name: String,
        magic: [u8; 4],
    },

    /// Text extraction failed (corrupt structure, unsupported encoding, …).
    #[error("Failed to extract text from PDF: {detail}")]
    ExtractFailed { detail: String },

    /// The PDF parsed but contains no extractable text (likely image-only).
    #[error("PDF contains no extractable text (may be image-based)")]
    EmptyDocument,

    // ── Backend errors ────────────────────────────────────────────────────
    /// No completion backend is configured (missing API key etc.).
    #[error("Completion backend is not configured.\n{hint}")]
    BackendNotConfigured { hint: String },

    /// The backend returned a non-2xx status.
    #[error("Backend error (HTTP {status}): {body}")]
    Backend { status: u16, body: String },

    /// Transport-level HTTP failure (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend reply had an unexpected shape (no choices, no data).
    #[error("Unexpected backend reply: {0}")]
    BadReply(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error. Never leaks internals beyond this message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error scoped to a single question.
///
/// Stored alongside [`crate::output::AnswerResult`] when a question fails.
/// The overall request still succeeds; the slot holds an empty answer.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum QuestionError {
    /// Completion call failed after all retries.
    #[error("Question {index}: completion failed after {retries} retries: {detail}")]
    LlmFailed {
        index: usize,
        retries: u32,
        detail: String,
    },

    /// The backend replied but no valid JSON answer could be extracted.
    #[error("Question {index}: could not parse backend reply: {detail}")]
    ParseFailed { index: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_display() {
        let e = QaError::InvalidRequest("missing document field".into());
        assert!(e.to_string().contains("missing document field"));
    }

    #[test]
    fn not_a_pdf_display() {
        let e = QaError::NotAPdf {
            source_name: "https://example.com/x.pdf".into(),
            magic: *b"<!DO",
        };
        let msg = e.to_string();
        assert!(msg.contains("example.com"), "got: {msg}");
    }

    #[test]
    fn download_timeout_display() {
        let e = QaError::DownloadTimeout {
            url: "https://example.com/doc.pdf".into(),
            secs: 60,
        };
        assert!(e.to_string().contains("60s"));
    }

    #[test]
    fn llm_failed_display() {
        let e = QuestionError::LlmFailed {
            index: 3,
            retries: 2,
            detail: "HTTP 503".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Question 3"));
        assert!(msg.contains("2 retries"));
    }

    #[test]
    fn parse_failed_roundtrips_through_serde() {
        let e = QuestionError::ParseFailed {
            index: 1,
            detail: "no opening brace".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: QuestionError = serde_json::from_str(&json).unwrap();
        assert!(back.to_string().contains("no opening brace"));
    }
}
