//! Error mapping utilities for API responses and OAuth2 token responses.

use serde::Deserialize;
use serde_json::Value;
use super::categories::{ApiError, AuthenticationError};

/// OAuth2 error response body (RFC 6749 section 5.2).
#[derive(Debug, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Extracts an `error` payload from a parsed response body.
///
/// The service normally reports `{"error": {"code", "message", "status"}}`, but a
/// bare string is accepted too.
pub fn extract_error_payload(json: &Value) -> Option<ApiError> {
    let error = json.get("error")?;

    match error {
        Value::Object(obj) => {
            let message = obj
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), ToString::to_string);

            Some(ApiError::Service {
                message,
                code: obj.get("code").and_then(Value::as_i64),
                status: obj.get("status").and_then(Value::as_str).map(ToString::to_string),
            })
        }
        Value::String(message) => Some(ApiError::Service {
            message: message.clone(),
            code: None,
            status: None,
        }),
        Value::Null => None,
        other => Some(ApiError::Service {
            message: other.to_string(),
            code: None,
            status: None,
        }),
    }
}

/// Maps an HTTP status and raw body to parsed JSON or an `ApiError`.
///
/// An `error` payload wins over the status code so the caller always sees the
/// service's own message when one was sent.
pub fn map_response_body(status: u16, body: &[u8]) -> Result<Value, ApiError> {
    let success = (200..300).contains(&status);

    match serde_json::from_slice::<Value>(body) {
        Ok(json) => {
            if let Some(error) = extract_error_payload(&json) {
                return Err(error);
            }
            if success {
                Ok(json)
            } else {
                Err(ApiError::HttpStatus {
                    status,
                    body: String::from_utf8_lossy(body).to_string(),
                })
            }
        }
        Err(_) if !success => Err(ApiError::HttpStatus {
            status,
            body: String::from_utf8_lossy(body).to_string(),
        }),
        Err(e) => Err(ApiError::InvalidResponse {
            message: format!("Failed to parse response body: {e}"),
        }),
    }
}

/// Maps a failed token endpoint response to an `AuthenticationError`.
///
/// Keeps the OAuth2 `error`/`error_description` pair when present, otherwise the
/// raw body text, so refresh failures stay diagnosable.
pub fn map_token_error(status: u16, body: &str) -> AuthenticationError {
    let detail = match serde_json::from_str::<OAuthErrorResponse>(body) {
        Ok(OAuthErrorResponse { error, error_description: Some(description) }) => {
            format!("{error}: {description}")
        }
        Ok(OAuthErrorResponse { error, error_description: None }) => error,
        Err(_) if body.trim().is_empty() => "<empty body>".to_string(),
        Err(_) => body.trim().to_string(),
    };

    AuthenticationError::RefreshFailed {
        message: format!("HTTP {status}: {detail}"),
    }
}
