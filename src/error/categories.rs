//! Error category types for granular error handling.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("API key is required when no OAuth2 credential is provided")]
    MissingCredential,

    #[error("Model is required")]
    MissingModel,

    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Missing OAuth2 field: {field}")]
    MissingOAuthField { field: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// OAuth2 token errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Token refresh failed: {message}")]
    RefreshFailed { message: String },

    #[error("Failed to obtain access token from refresh response")]
    MissingAccessToken,
}

/// Errors reported by, or while talking to, the generative API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Gemini API error: {message}")]
    Service {
        message: String,
        code: Option<i64>,
        status: Option<String>,
    },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

/// Missing local or remote resources.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("Image file not found: {path}")]
    ImageFile { path: String },

    #[error("Failed to download image from URL {url}: {reason}")]
    ImageDownload { url: String, reason: String },
}

/// Caller-supplied arguments that cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgumentError {
    #[error("Malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("Unsupported URL scheme: {scheme}")]
    UnsupportedScheme { scheme: String },
}

/// Operations the active model cannot perform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedOperationError {
    #[error("Image input only supported for vision models. Current model: {model}")]
    VisionNotSupported { model: String },
}
