//! Relevance scoring: lexical (bigram Dice) and vector (cosine) similarity.
//!
//! Two interchangeable strategies. Lexical similarity needs no external call
//! and is the default; cosine similarity is used when embeddings are
//! available for the question *and* every chunk. The two score domains are
//! never mixed inside one ranking — a missing embedding downgrades the whole
//! ranking to lexical rather than scoring one chunk differently from its
//! neighbours.
//!
//! Scoring is a pure function of its inputs; chunks are never mutated.

use crate::pipeline::chunk::{floor_char_boundary, Chunk};

/// A chunk index paired with its relevance score for one question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredChunk {
    pub index: usize,
    pub score: f32,
}

/// Bigram Dice similarity over lowercased text with whitespace removed.
///
/// Symmetric, range [0, 1]. Equal strings score 1.0; strings too short to
/// form a bigram score 0.0 against anything but themselves.
pub fn dice_similarity(a: &str, b: &str) -> f32 {
    let a_norm: String = a.to_lowercase().split_whitespace().collect();
    let b_norm: String = b.to_lowercase().split_whitespace().collect();

    if a_norm == b_norm {
        return 1.0;
    }

    let a_bigrams = bigram_counts(&a_norm);
    let b_bigrams = bigram_counts(&b_norm);
    let a_total: usize = a_bigrams.values().sum();
    let b_total: usize = b_bigrams.values().sum();

    if a_total == 0 || b_total == 0 {
        return 0.0;
    }

    let mut shared = 0usize;
    for (bigram, count) in &a_bigrams {
        if let Some(other) = b_bigrams.get(bigram) {
            shared += count.min(other);
        }
    }

    (2 * shared) as f32 / (a_total + b_total) as f32
}

fn bigram_counts(s: &str) -> std::collections::HashMap<(char, char), usize> {
    let chars: Vec<char> = s.chars().collect();
    let mut counts = std::collections::HashMap::new();
    for pair in chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

/// Cosine similarity between two vectors of equal dimensionality.
///
/// Returns 0.0 for zero-norm or mismatched-length input rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Embeddings available for one ranking: the question's vector plus one
/// vector per chunk, in chunk order.
pub struct RankingEmbeddings<'a> {
    pub question: &'a [f32],
    pub chunks: &'a [Vec<f32>],
}

/// Score every chunk against a question, in chunk order.
///
/// Uses cosine similarity when `embeddings` is present, covers every chunk,
/// and contains no empty vector; otherwise falls back to lexical similarity
/// (optionally over the first `lexical_prefix` bytes of each chunk).
pub fn rank_chunks(
    question: &str,
    chunks: &[Chunk],
    embeddings: Option<RankingEmbeddings<'_>>,
    lexical_prefix: Option<usize>,
) -> Vec<ScoredChunk> {
    if let Some(emb) = embeddings {
        let usable = !emb.question.is_empty()
            && emb.chunks.len() == chunks.len()
            && emb.chunks.iter().all(|v| !v.is_empty());
        if usable {
            return chunks
                .iter()
                .zip(emb.chunks.iter())
                .map(|(chunk, vector)| ScoredChunk {
                    index: chunk.index,
                    score: cosine_similarity(emb.question, vector),
                })
                .collect();
        }
        tracing::warn!("incomplete embeddings; falling back to lexical scoring");
    }

    chunks
        .iter()
        .map(|chunk| {
            let text = match lexical_prefix {
                Some(n) => &chunk.text[..floor_char_boundary(&chunk.text, n)],
                None => chunk.text.as_str(),
            };
            ScoredChunk {
                index: chunk.index,
                score: dice_similarity(question, text),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks_of(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk {
                text: t.to_string(),
                offset: 0,
                index: i,
            })
            .collect()
    }

    #[test]
    fn dice_is_symmetric() {
        let pairs = [
            ("healed", "sealed"),
            ("When was Acme founded?", "Acme Corp was founded in 1990."),
            ("", "abc"),
            ("a", "b"),
            ("ünïcode", "unicode"),
        ];
        for (a, b) in pairs {
            assert_eq!(dice_similarity(a, b), dice_similarity(b, a), "{a} / {b}");
        }
    }

    #[test]
    fn dice_bounds() {
        assert_eq!(dice_similarity("night", "night"), 1.0);
        assert_eq!(dice_similarity("abc", "xyz"), 0.0);
        let s = dice_similarity("healed", "sealed");
        assert!(s > 0.0 && s < 1.0);
    }

    #[test]
    fn dice_ignores_case_and_whitespace() {
        assert_eq!(dice_similarity("Hello World", "helloworld"), 1.0);
    }

    #[test]
    fn dice_short_strings() {
        assert_eq!(dice_similarity("a", "a"), 1.0);
        assert_eq!(dice_similarity("a", "ab"), 0.0);
        assert_eq!(dice_similarity("", ""), 1.0);
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_degenerate_input_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn rank_uses_cosine_when_embeddings_complete() {
        let chunks = chunks_of(&["alpha", "beta"]);
        let chunk_vecs = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let scored = rank_chunks(
            "q",
            &chunks,
            Some(RankingEmbeddings {
                question: &[1.0, 0.0],
                chunks: &chunk_vecs,
            }),
            None,
        );
        assert!(scored[0].score > scored[1].score);
    }

    #[test]
    fn rank_falls_back_to_lexical_on_missing_vector() {
        let chunks = chunks_of(&["the founding year", "unrelated text"]);
        let chunk_vecs = vec![vec![1.0, 0.0], vec![]]; // one null vector
        let scored = rank_chunks(
            "founding year",
            &chunks,
            Some(RankingEmbeddings {
                question: &[1.0, 0.0],
                chunks: &chunk_vecs,
            }),
            None,
        );
        // Lexical ranking: first chunk shares bigrams with the question.
        assert!(scored[0].score > scored[1].score);
        assert!(scored[0].score <= 1.0 && scored[0].score >= 0.0);
    }

    #[test]
    fn rank_respects_lexical_prefix() {
        // Relevant words hidden beyond the prefix are not scored.
        let mut far = "x".repeat(100);
        far.push_str(" founding year");
        let chunks = chunks_of(&[&far]);
        let full = rank_chunks("founding year", &chunks, None, None);
        let prefixed = rank_chunks("founding year", &chunks, None, Some(50));
        assert!(full[0].score > prefixed[0].score);
    }
}
