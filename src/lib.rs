//! # pdfqa
//!
//! Answer natural-language questions about a PDF document using an LLM.
//!
//! ## Why this crate?
//!
//! Long PDFs do not fit in one completion request, and shipping the whole
//! document to the backend for every question is slow and expensive. Instead
//! this crate extracts the text once, splits it into overlapping chunks,
//! scores each chunk's relevance per question (lexical bigram similarity by
//! default, embeddings optionally), and sends only the best few chunks as
//! context — so each question costs one small completion call regardless of
//! document length.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Fetch    resolve local file or download from URL
//!  ├─ 2. Extract  PDF → plain text (CPU-bound, spawn_blocking)
//!  ├─ 3. Chunk    fixed-size overlapping windows
//!  ├─ 4. Score    bigram Dice or embedding cosine, per question
//!  ├─ 5. Select   top-k chunks → one bounded context string
//!  ├─ 6. Ask      concurrent completion calls with retry
//!  ├─ 7. Parse    dig the JSON answer out of a possibly messy reply
//!  └─ 8. Output   answers aligned one-to-one with the questions
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfqa::{answer, QaConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Backend resolved from OPENAI_API_KEY / PDFQA_BASE_URL / PDFQA_MODEL
//!     let config = QaConfig::default();
//!     let questions = vec![
//!         "When was the company founded?".to_string(),
//!         "Who is the current CEO?".to_string(),
//!     ];
//!     let output = answer("https://example.com/report.pdf", &questions, &config).await?;
//!     for (q, a) in questions.iter().zip(&output.answers) {
//!         println!("{q}\n  → {a}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Partial Failure
//!
//! A question whose completion call keeps failing, or whose reply cannot be
//! parsed, degrades to an empty string in `output.answers` — it never fails
//! the request or disturbs its neighbours. `output.results` carries the
//! per-question error detail; `output.answers.len()` always equals the
//! number of questions asked.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfqa` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfqa = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod answer;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use answer::{answer, answer_request, answer_text};
pub use config::{AnswerMode, QaConfig, QaConfigBuilder};
pub use error::{QaError, QuestionError};
pub use llm::{CompletionClient, Embedder, EmbeddingCache, MemoryEmbeddingCache, OpenAiClient};
pub use output::{AnswerResult, DocumentMetadata, QaOutput, QaStats};
pub use prompts::NOT_AVAILABLE;
pub use request::QaRequest;
