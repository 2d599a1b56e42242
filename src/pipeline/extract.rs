//! Text extraction: PDF bytes → plain text.
//!
//! Extraction is treated as a black box: `pdf-extract` walks the content
//! streams and returns a single string. It is CPU-bound and not async-safe,
//! so it runs under `spawn_blocking` to keep the runtime's worker threads
//! free for network I/O.

use crate::error::QaError;
use tokio::task;
use tracing::debug;

/// Extract plain text from PDF bytes.
///
/// Fails with [`QaError::ExtractFailed`] when the PDF structure cannot be
/// parsed and [`QaError::EmptyDocument`] when parsing succeeds but yields no
/// text (typically a scanned, image-only document).
pub async fn extract_text(bytes: Vec<u8>) -> Result<String, QaError> {
    let text = task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| QaError::Internal(format!("extraction task panicked: {}", e)))?
        .map_err(|e| QaError::ExtractFailed {
            detail: e.to_string(),
        })?;

    if text.trim().is_empty() {
        return Err(QaError::EmptyDocument);
    }

    debug!("Extracted {} bytes of text", text.len());
    Ok(text)
}
