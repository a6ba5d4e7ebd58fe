use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the catalog client and the view state
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response (DNS, TLS, connection reset, ...)
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("API returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// A submission was rejected locally before any request was sent
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// The API answered 2xx but the body was not what we expected
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn missing(field: &'static str) -> Self {
        Self::Validation {
            field,
            reason: "is required".to_string(),
        }
    }

    /// True for errors raised before touching the network
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
