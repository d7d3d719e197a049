//! Service-level error type.
//!
//! Only failures the caller must react to are errors here. Retrieval misses,
//! an empty index and per-file extraction failures are normal outcomes and
//! never surface as [`ServiceError`].

use thiserror::Error;

use crate::calc::CalcError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or invalid request fields. Maps to HTTP 400.
    #[error("{0}")]
    InvalidInput(String),

    /// The calculator rejected the expression. Maps to HTTP 400.
    #[error("invalid expression: {0}")]
    Calc(#[from] CalcError),

    /// Reindexing could not write the index file. Maps to HTTP 500.
    #[error("reindex failed: {0:#}")]
    Reindex(anyhow::Error),
}

impl ServiceError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput(message.into())
    }

    /// True for errors caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::InvalidInput(_) | ServiceError::Calc(_))
    }
}
