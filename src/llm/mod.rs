//! Backend seams: completion, embeddings, and the embedding cache.
//!
//! The pipeline never talks HTTP directly — it goes through the
//! [`CompletionClient`] and [`Embedder`] trait objects so tests can inject
//! deterministic fakes and deployments can swap backends without touching
//! retrieval logic. [`OpenAiClient`] is the default implementation of both,
//! speaking the OpenAI-compatible `/v1/chat/completions` and `/v1/embeddings`
//! wire format (vLLM, OpenAI, LM Studio, …).

pub mod cache;
pub mod client;

pub use cache::{embedding_cache_key, EmbeddingCache, MemoryEmbeddingCache};
pub use client::{ChatMessage, OpenAiClient};

use crate::error::QaError;
use async_trait::async_trait;

/// A text-completion backend.
///
/// Implementations send the messages with `temperature` and a bounded output
/// token budget and return the raw assistant text. Callers own retry policy;
/// implementations should fail fast on transport or protocol errors.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, QaError>;
}

/// An embedding backend: one numeric vector per input text.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, QaError>;
}
