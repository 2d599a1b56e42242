//! Chunking: split document text into fixed-size overlapping windows.
//!
//! Chunking is pure and deterministic — the same text and parameters always
//! yield the same chunk sequence, which is what makes the embedding cache
//! safe to key by (document, parameters). Windows start at fixed strides of
//! `size - overlap` bytes, clamped to UTF-8 character boundaries; clamping
//! is monotone, so coverage never has gaps.

/// A contiguous window of document text.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// The window's text.
    pub text: String,
    /// Byte offset of the window start in the source text.
    pub offset: usize,
    /// Position of this chunk in the chunk sequence.
    pub index: usize,
}

/// Find a valid char boundary at or before the given byte index.
pub(crate) fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Split `text` into windows of `size` bytes overlapping by `overlap` bytes.
///
/// Windows start at offsets `0, size-overlap, 2*(size-overlap), …`; the
/// final window may be shorter than `size`. `overlap < size` is a
/// precondition enforced at configuration build time, not here.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    debug_assert!(size > 0 && overlap < size);

    if text.is_empty() {
        return Vec::new();
    }

    let stride = size - overlap;
    let mut chunks = Vec::new();
    let mut raw_start = 0usize;

    loop {
        let start = floor_char_boundary(text, raw_start);
        let end = floor_char_boundary(text, raw_start.saturating_add(size).min(text.len()));

        chunks.push(Chunk {
            text: text[start..end].to_string(),
            offset: start,
            index: chunks.len(),
        });

        if end >= text.len() {
            break;
        }
        raw_start += stride;
    }

    chunks
}
