//! Embedding cache: read-many/write-once storage for chunk embeddings.
//!
//! Chunking is deterministic, so the embeddings of a document's chunks are a
//! pure function of (document identity, chunk parameters, embedding model) —
//! which makes them safe to cache for the life of the process with no
//! invalidation. The cache is an injected dependency ([`EmbeddingCache`])
//! rather than a global, so deployments can swap in an expiring or bounded
//! store without touching pipeline logic.
//!
//! No locking discipline is needed beyond the `RwLock`: population is
//! idempotent, and two tasks racing to fill the same key write equivalent
//! values.

use std::collections::HashMap;
use std::sync::RwLock;

/// Storage interface for per-document chunk embeddings.
pub trait EmbeddingCache: Send + Sync {
    /// Fetch the cached embeddings for a key, if present.
    fn get(&self, key: &str) -> Option<Vec<Vec<f32>>>;
    /// Store embeddings under a key. Overwriting an existing entry is
    /// harmless (recomputation yields an equivalent value).
    fn put(&self, key: String, embeddings: Vec<Vec<f32>>);
}

/// Default in-memory cache. Entries live for the process lifetime.
#[derive(Default)]
pub struct MemoryEmbeddingCache {
    entries: RwLock<HashMap<String, Vec<Vec<f32>>>>,
}

impl MemoryEmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EmbeddingCache for MemoryEmbeddingCache {
    fn get(&self, key: &str) -> Option<Vec<Vec<f32>>> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn put(&self, key: String, embeddings: Vec<Vec<f32>>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, embeddings);
        }
    }
}

/// Cache key for a document's chunk embeddings.
///
/// Hashes the document source so URLs with credentials or very long query
/// strings do not end up verbatim in memory dumps; the chunk parameters and
/// model are part of the key because any of them changes the vectors.
pub fn embedding_cache_key(
    model: &str,
    source: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    format!(
        "embed:{}:{}x{}:{:x}",
        model,
        chunk_size,
        chunk_overlap,
        hasher.finish()
    )
}
