//! # Error Types Module
//!
//! Typed errors returned at each component boundary, so callers can tell a
//! failed corpus load from a failed index build from an OCR failure.
//! Malformed label text is not an error: the normalizer and parser recover
//! locally with sentinels and empty lists.

use thiserror::Error;

/// Errors loading the product corpus
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The product store could not be reached
    #[error("connection error: {0}")]
    Connection(String),
    /// The product query failed
    #[error("query error: {0}")]
    Query(String),
    /// A corpus file could not be read
    #[error("I/O error: {0}")]
    Io(String),
    /// A corpus file could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => CatalogError::Connection(err.to_string()),
            _ => CatalogError::Query(err.to_string()),
        }
    }
}

/// Errors building the similarity index
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    /// No product has usable ingredients text
    #[error("no products with valid ingredients in a corpus of {total}")]
    NoEligibleProducts { total: usize },
    /// Document frequency pruning removed every term
    #[error("empty vocabulary after pruning; the documents may only contain stop words")]
    EmptyVocabulary,
    /// Vectorizer settings cannot be satisfied by this corpus
    #[error("invalid vectorizer parameters: {0}")]
    InvalidParameters(String),
}

/// Errors surfaced by the recommendation engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecommendationError {
    #[error("failed to load product corpus: {0}")]
    Catalog(#[from] CatalogError),
    #[error("failed to build similarity index: {0}")]
    Index(#[from] IndexError),
    /// The engine has no index to serve from
    #[error("recommendation system could not be initialized: {0}")]
    Unavailable(String),
}

/// Errors extracting text from a product photo
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OcrError {
    /// Image rejected before extraction
    #[error("validation error: {0}")]
    Validation(String),
    /// Image format the vision model does not accept
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    /// The extraction request failed
    #[error("request error: {0}")]
    Request(String),
    /// The extraction service refused the request, e.g. an invalid API key
    #[error("request rejected: {0}")]
    Rejected(String),
    /// The extraction service answered with an unusable payload
    #[error("response error: {0}")]
    Response(String),
    /// The extraction request timed out
    #[error("timeout error: {0}")]
    Timeout(String),
    /// Too many recent failures, requests are refused until the breaker resets
    #[error("text extraction temporarily disabled after repeated failures")]
    CircuitOpen,
}

impl OcrError {
    /// Whether repeating the same request can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OcrError::Request(_) | OcrError::Response(_) | OcrError::Timeout(_)
        )
    }
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OcrError::Timeout(err.to_string())
        } else if err.is_decode() {
            OcrError::Response(err.to_string())
        } else {
            OcrError::Request(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CatalogError::Connection("refused".to_string()).to_string(),
            "connection error: refused"
        );
        assert_eq!(
            IndexError::NoEligibleProducts { total: 4 }.to_string(),
            "no products with valid ingredients in a corpus of 4"
        );
        assert_eq!(
            OcrError::CircuitOpen.to_string(),
            "text extraction temporarily disabled after repeated failures"
        );
    }

    #[test]
    fn test_only_transient_ocr_errors_are_retryable() {
        assert!(OcrError::Request("503 Service Unavailable".to_string()).is_retryable());
        assert!(OcrError::Timeout("30s".to_string()).is_retryable());
        assert!(!OcrError::Rejected("401 Unauthorized".to_string()).is_retryable());
        assert!(!OcrError::Validation("too small".to_string()).is_retryable());
        assert!(!OcrError::CircuitOpen.is_retryable());
    }

    #[test]
    fn test_recommendation_error_wraps_sources() {
        let err: RecommendationError = CatalogError::Query("no such table".to_string()).into();
        assert_eq!(
            err.to_string(),
            "failed to load product corpus: query error: no such table"
        );

        let err: RecommendationError = IndexError::EmptyVocabulary.into();
        assert!(matches!(err, RecommendationError::Index(IndexError::EmptyVocabulary)));
    }

    #[test]
    fn test_sqlx_pool_timeout_is_connection_error() {
        let err: CatalogError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, CatalogError::Connection(_)));

        let err: CatalogError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, CatalogError::Query(_)));
    }
}
