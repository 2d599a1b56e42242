//! Pipeline stages for document question answering.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch scoring strategy) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ extract ──▶ chunk ──▶ score ──▶ select ──▶ ask ──▶ parse ──▶ assemble
//! (URL/path) (pdf text) (windows) (dice/   (top-k    (LLM)   (JSON)   (ordered
//!                                  cosine)  context)                    answers)
//! ```
//!
//! 1. [`fetch`]    — resolve the user-supplied path or URL to PDF bytes
//! 2. [`extract`]  — pull plain text out of the PDF; runs in `spawn_blocking`
//!    because the parser is CPU-bound and not async
//! 3. [`chunk`]    — split text into fixed-size overlapping windows
//! 4. [`score`]    — rate each chunk's relevance to a question (lexical
//!    bigram Dice, or cosine over embeddings when available)
//! 5. [`select`]   — keep the top-k chunks and join them into one bounded
//!    context string
//! 6. [`ask`]      — drive the completion call with retries; the only stage
//!    with network I/O
//! 7. [`parse`]    — dig the JSON answer object out of a possibly messy reply
//! 8. [`assemble`] — merge answers into slots aligned with question order

pub mod ask;
pub mod assemble;
pub mod chunk;
pub mod extract;
pub mod fetch;
pub mod parse;
pub mod score;
pub mod select;
