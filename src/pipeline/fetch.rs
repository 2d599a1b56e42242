//! Document fetching: normalise a user-supplied path or URL to PDF bytes.
//!
//! ## Why bytes, not a temp file?
//!
//! Text extraction works from an in-memory buffer, so there is no reason to
//! touch the filesystem for downloads. We validate the PDF magic bytes
//! (`%PDF`) before returning so callers get a meaningful error rather than a
//! parser failure deep inside extraction.

use crate::error::QaError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to raw PDF bytes.
///
/// If the input is a URL, download it (bounded by `timeout_secs`).
/// If the input is a local file, read it from disk.
/// Either way the `%PDF` magic bytes are verified.
pub async fn fetch_document(input: &str, timeout_secs: u64) -> Result<Vec<u8>, QaError> {
    let bytes = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };

    verify_magic(input, &bytes)?;
    Ok(bytes)
}

async fn read_local(path_str: &str) -> Result<Vec<u8>, QaError> {
    let path = PathBuf::from(path_str);

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
            Ok(bytes)
        }
        Err(_) => Err(QaError::FileNotFound { path }),
    }
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, QaError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| QaError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            QaError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            QaError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(QaError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            QaError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            QaError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

fn verify_magic(source: &str, bytes: &[u8]) -> Result<(), QaError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(QaError::NotAPdf {
            source_name: source.to_string(),
            magic,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn magic_check_accepts_pdf_header() {
        assert!(verify_magic("x.pdf", b"%PDF-1.7 rest").is_ok());
    }

    #[test]
    fn magic_check_rejects_html() {
        let err = verify_magic("x.pdf", b"<!DOCTYPE html>").unwrap_err();
        assert!(matches!(err, QaError::NotAPdf { .. }));
    }

    #[test]
    fn magic_check_rejects_short_input() {
        assert!(verify_magic("x.pdf", b"%P").is_err());
    }

    #[tokio::test]
    async fn missing_local_file_is_file_not_found() {
        let err = fetch_document("/definitely/not/a/real/file.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, QaError::FileNotFound { .. }));
    }
}
