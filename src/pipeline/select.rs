//! Context selection: top-k chunks per question, joined and bounded.
//!
//! Sorting must be stable on ties — scorer output ties exactly for short or
//! empty chunks, and the tie-break is original chunk order. Rust's `sort_by`
//! is stable, so sorting by descending score alone preserves that order.

use crate::pipeline::chunk::{floor_char_boundary, Chunk};
use crate::pipeline::score::ScoredChunk;

/// Pick the `k` highest-scoring chunks, preserving chunk order on ties.
pub fn top_k(mut scored: Vec<ScoredChunk>, k: usize) -> Vec<ScoredChunk> {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Join the selected chunks' text with `separator`, capped at `max_chars`
/// bytes (cut at a UTF-8 character boundary, never mid-codepoint).
pub fn build_context(
    selected: &[ScoredChunk],
    chunks: &[Chunk],
    separator: &str,
    max_chars: usize,
) -> String {
    let joined = selected
        .iter()
        .filter_map(|s| chunks.get(s.index))
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(separator);

    if joined.len() <= max_chars {
        return joined;
    }
    let cut = floor_char_boundary(&joined, max_chars);
    joined[..cut].to_string()
}
