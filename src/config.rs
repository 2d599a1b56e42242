//! Configuration types for PDF question answering.
//!
//! All pipeline behaviour is controlled through [`QaConfig`], built via its
//! [`QaConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! share configs across tasks, log them, and diff two runs to understand why
//! their answers differ.
//!
//! # Design choice: builder over constructor
//! A twenty-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest; `build()` is the single place where the
//! cross-field invariants (notably `chunk_overlap < chunk_size`) are checked.

use crate::error::QaError;
use crate::llm::{CompletionClient, Embedder, EmbeddingCache};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How answers are requested from the completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnswerMode {
    /// One completion call per question, context = that question's top-k
    /// chunks. Questions fan out concurrently up to `concurrency`. (default)
    #[default]
    PerQuestion,
    /// One batched completion call per document sweep, carrying every
    /// still-unanswered question. Sweeps run strictly sequentially.
    Sweep,
}

/// Configuration for answering questions against a document.
///
/// Built via [`QaConfig::builder()`] or using [`QaConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfqa::QaConfig;
///
/// let config = QaConfig::builder()
///     .chunk_size(1500)
///     .top_k(5)
///     .concurrency(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct QaConfig {
    /// Chunk window size in bytes (clamped to UTF-8 boundaries). Default: 2000.
    ///
    /// Chunks are the unit of retrieval: small enough that a handful of them
    /// fit comfortably in one completion request, large enough that an answer
    /// span rarely straddles a boundary.
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in bytes. Default: 200.
    ///
    /// Overlap keeps answer spans near a chunk boundary visible in at least
    /// one window. Must be strictly less than `chunk_size`; `build()`
    /// rejects the configuration otherwise.
    pub chunk_overlap: usize,

    /// Number of top-scoring chunks joined into one context. Default: 3.
    pub top_k: usize,

    /// Upper bound on the joined context length in bytes. Default: 8000.
    ///
    /// Respects downstream payload limits. Truncation happens at a UTF-8
    /// character boundary, after joining, before transmission.
    pub max_context_chars: usize,

    /// Separator between selected chunks inside one context. Default: "\n\n---\n\n".
    ///
    /// Chosen to be unlikely to occur inside extracted PDF prose.
    pub context_separator: String,

    /// Score only the first N bytes of each chunk when using lexical
    /// similarity. `None` scores whole chunks. Default: `Some(1200)`.
    ///
    /// Bigram similarity is quadratic-ish in practice on long inputs; a
    /// prefix is almost as discriminative at a fraction of the cost.
    pub lexical_prefix_chars: Option<usize>,

    /// Number of questions processed concurrently in per-question mode.
    /// Default: 5.
    ///
    /// Completion APIs are network-bound; a small fan-out cuts wall-clock
    /// time without tripping backend rate limits. Lower this if you see 429s.
    pub concurrency: usize,

    /// How many chunks form one sweep's shared context in [`AnswerMode::Sweep`].
    /// Default: 3.
    pub sweep_chunks: usize,

    /// Per-question vs batched sweep requests. Default: [`AnswerMode::PerQuestion`].
    pub mode: AnswerMode,

    /// Completion model identifier, e.g. "gpt-4o". If `None`, the client's
    /// default (or `PDFQA_MODEL`) is used.
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible backend. If `None`, the client's
    /// default (or `PDFQA_BASE_URL`) is used.
    pub base_url: Option<String>,

    /// Pre-constructed completion client. Takes precedence over
    /// `model`/`base_url` env resolution. Useful in tests or when the caller
    /// needs custom middleware.
    pub client: Option<Arc<dyn CompletionClient>>,

    /// Score chunks with embeddings + cosine similarity instead of lexical
    /// similarity. Default: false.
    ///
    /// Embedding failures are never fatal: scoring falls back to lexical
    /// similarity for the affected ranking.
    pub use_embeddings: bool,

    /// Pre-constructed embedding backend. Only consulted when
    /// `use_embeddings` is true; if `None`, the default client is used.
    pub embedder: Option<Arc<dyn Embedder>>,

    /// Cache for chunk embeddings, keyed by document identity. If `None`, a
    /// process-wide in-memory cache is used. Inject an expiring or bounded
    /// store here without touching pipeline logic.
    pub embedding_cache: Option<Arc<dyn EmbeddingCache>>,

    /// Sampling temperature for completion calls. Default: 0.0.
    ///
    /// Zero makes the backend deterministic and faithful to the excerpt,
    /// which is what extraction-style QA wants.
    pub temperature: f32,

    /// Maximum tokens the backend may generate per call. Default: 500.
    pub max_tokens: u32,

    /// Retry attempts after the first failed completion call. Default: 2.
    ///
    /// Exhausted retries degrade the affected question(s) to an empty
    /// answer; they never fail the whole request.
    pub max_retries: u32,

    /// Fixed delay between retry attempts, in milliseconds. Default: 500.
    pub retry_delay_ms: u64,

    /// Custom system prompt for per-question mode. If `None`, uses the
    /// built-in default from [`crate::prompts`].
    pub system_prompt: Option<String>,

    /// Upper bound on the number of questions per request. Default: `Some(100)`.
    /// `None` disables the check.
    pub max_questions: Option<usize>,

    /// Document download timeout in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Per completion/embedding call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
            top_k: 3,
            max_context_chars: 8000,
            context_separator: "\n\n---\n\n".to_string(),
            lexical_prefix_chars: Some(1200),
            concurrency: 5,
            sweep_chunks: 3,
            mode: AnswerMode::PerQuestion,
            model: None,
            base_url: None,
            client: None,
            use_embeddings: false,
            embedder: None,
            embedding_cache: None,
            temperature: 0.0,
            max_tokens: 500,
            max_retries: 2,
            retry_delay_ms: 500,
            system_prompt: None,
            max_questions: Some(100),
            download_timeout_secs: 60,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for QaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QaConfig")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("top_k", &self.top_k)
            .field("max_context_chars", &self.max_context_chars)
            .field("lexical_prefix_chars", &self.lexical_prefix_chars)
            .field("concurrency", &self.concurrency)
            .field("sweep_chunks", &self.sweep_chunks)
            .field("mode", &self.mode)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("client", &self.client.as_ref().map(|_| "<dyn CompletionClient>"))
            .field("use_embeddings", &self.use_embeddings)
            .field("embedder", &self.embedder.as_ref().map(|_| "<dyn Embedder>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("max_questions", &self.max_questions)
            .finish()
    }
}

impl QaConfig {
    /// Create a new builder for `QaConfig`.
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`QaConfig`].
#[derive(Debug)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k.max(1);
        self
    }

    pub fn max_context_chars(mut self, n: usize) -> Self {
        self.config.max_context_chars = n;
        self
    }

    pub fn context_separator(mut self, sep: impl Into<String>) -> Self {
        self.config.context_separator = sep.into();
        self
    }

    pub fn lexical_prefix_chars(mut self, n: Option<usize>) -> Self {
        self.config.lexical_prefix_chars = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn sweep_chunks(mut self, n: usize) -> Self {
        self.config.sweep_chunks = n.max(1);
        self
    }

    pub fn mode(mut self, mode: AnswerMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn use_embeddings(mut self, v: bool) -> Self {
        self.config.use_embeddings = v;
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.config.embedder = Some(embedder);
        self
    }

    pub fn embedding_cache(mut self, cache: Arc<dyn EmbeddingCache>) -> Self {
        self.config.embedding_cache = Some(cache);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry_delay_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_questions(mut self, n: Option<usize>) -> Self {
        self.config.max_questions = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating cross-field constraints.
    pub fn build(self) -> Result<QaConfig, QaError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(QaError::InvalidConfig("chunk_size must be ≥ 1".into()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(QaError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.top_k == 0 {
            return Err(QaError::InvalidConfig("top_k must be ≥ 1".into()));
        }
        if c.concurrency == 0 {
            return Err(QaError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        if c.max_tokens == 0 {
            return Err(QaError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        let config = QaConfig::builder().build().expect("defaults are valid");
        assert_eq!(config.chunk_size, 2000);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.mode, AnswerMode::PerQuestion);
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        let err = QaConfig::builder()
            .chunk_size(100)
            .chunk_overlap(100)
            .build()
            .unwrap_err();
        assert!(matches!(err, QaError::InvalidConfig(_)));
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let err = QaConfig::builder().chunk_size(0).build().unwrap_err();
        assert!(matches!(err, QaError::InvalidConfig(_)));
    }

    #[test]
    fn top_k_floor_is_one() {
        let config = QaConfig::builder().top_k(0).build().unwrap();
        assert_eq!(config.top_k, 1);
    }

    #[test]
    fn temperature_is_clamped() {
        let config = QaConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }
}
