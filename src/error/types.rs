//! Main error type for the generative AI client.

use thiserror::Error;
use super::categories::*;
use crate::transport::TransportError;

/// Result type alias for client operations.
pub type GenAiResult<T> = Result<T, GenAiError>;

/// Top-level error type for the integration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenAiError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgumentError),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(#[from] UnsupportedOperationError),
}

impl GenAiError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "GENAI_CONFIG",
            Self::Authentication(_) => "GENAI_AUTH",
            Self::Api(_) => "GENAI_API",
            Self::NotFound(_) => "GENAI_NOT_FOUND",
            Self::InvalidArgument(_) => "GENAI_INVALID_ARGUMENT",
            Self::UnsupportedOperation(_) => "GENAI_UNSUPPORTED",
        }
    }

    /// Returns the message reported by the remote service, if this error carries one.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Self::Api(ApiError::Service { message, .. }) => Some(message),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GenAiError {
    fn from(err: serde_json::Error) -> Self {
        GenAiError::Api(ApiError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

impl From<TransportError> for GenAiError {
    fn from(err: TransportError) -> Self {
        GenAiError::Api(ApiError::Transport {
            message: err.to_string(),
        })
    }
}
