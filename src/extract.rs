//! Text extraction for textbook files.
//!
//! The indexer only ever sees bytes in and text out through the
//! [`TextExtractor`] trait. [`PdfExtractor`] is the production
//! implementation backed by `pdf-extract`; tests substitute in-memory
//! extractors so indexing can be exercised without real PDFs.

use std::time::Duration;
use thiserror::Error;

/// Extraction failure for a single file. The indexer logs it and skips the file.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Converts raw document bytes into plain UTF-8 text.
///
/// Implementations must not panic on malformed input; return an error and
/// let the caller decide whether to skip the document.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Extracts text from PDF bytes with `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pdf_returns_error() {
        let err = PdfExtractor.extract(b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn error_messages_are_descriptive() {
        assert_eq!(
            ExtractError::Timeout(Duration::from_secs(30)).to_string(),
            "extraction timed out after 30s"
        );
        assert_eq!(
            ExtractError::Timeout(Duration::from_millis(50)).to_string(),
            "extraction timed out after 50ms"
        );
    }
}
