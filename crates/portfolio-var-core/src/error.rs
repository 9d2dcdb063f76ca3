use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortfolioVarError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid confidence level {value}: must lie strictly between 0 and 1")]
    InvalidConfidence { value: f64 },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Upstream data error for '{ticker}': {reason}")]
    UpstreamData { ticker: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// The three error kinds surfaced to callers of `compute_var`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    InsufficientData,
    UpstreamDataError,
}

impl PortfolioVarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortfolioVarError::InvalidInput { .. }
            | PortfolioVarError::InvalidConfidence { .. }
            | PortfolioVarError::SerializationError(_) => ErrorKind::InvalidInput,
            PortfolioVarError::InsufficientData(_) => ErrorKind::InsufficientData,
            PortfolioVarError::UpstreamData { .. } => ErrorKind::UpstreamDataError,
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        PortfolioVarError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn upstream(ticker: &str, reason: impl Into<String>) -> Self {
        PortfolioVarError::UpstreamData {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PortfolioVarError {
    fn from(e: serde_json::Error) -> Self {
        PortfolioVarError::SerializationError(e.to_string())
    }
}
