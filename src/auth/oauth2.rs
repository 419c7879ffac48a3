//! OAuth2 refresh-token provider.

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::TokenProvider;
use crate::config::{TokenProviderConfig, DEFAULT_CONNECT_TIMEOUT_SECS};
use crate::error::{map_token_error, AuthenticationError, GenAiResult};
use crate::transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};

/// Lifetime assumed when the token endpoint omits `expires_in` (1 hour).
pub const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3600;

/// Tokens are treated as expired this many seconds before the server says so.
pub const TOKEN_EXPIRY_MARGIN_SECONDS: i64 = 60;

/// Cached access token and the epoch second at which it stops being used.
struct CachedToken {
    access_token: SecretString,
    expires_at: i64,
}

impl CachedToken {
    fn is_valid_at(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<Value>,
}

/// Reads `expires_in` as a number or a numeric string.
///
/// Missing, negative or unparseable values fall back to [`DEFAULT_EXPIRES_IN_SECONDS`].
fn lifetime_seconds(expires_in: Option<&Value>) -> i64 {
    let seconds = match expires_in {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    seconds
        .filter(|s| *s >= 0)
        .unwrap_or(DEFAULT_EXPIRES_IN_SECONDS)
}

/// Epoch second after which a token issued at `now` is no longer used.
fn expiry_epoch_seconds(now: i64, lifetime: i64) -> i64 {
    now.saturating_add(lifetime)
        .saturating_sub(TOKEN_EXPIRY_MARGIN_SECONDS)
}

/// OAuth2 provider that exchanges a refresh token for access tokens.
///
/// Tokens are cached in memory and refreshed lazily on the first call after
/// they expire. The cache slot is locked across check and refresh, so
/// concurrent callers trigger a single token request.
pub struct OAuth2TokenProvider {
    config: TokenProviderConfig,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    cached_token: Mutex<Option<CachedToken>>,
}

impl OAuth2TokenProvider {
    /// Creates a provider backed by a reqwest transport and the system clock.
    pub fn new(config: TokenProviderConfig) -> GenAiResult<Self> {
        let transport = ReqwestTransport::new(
            config.timeout,
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        )?;
        Self::with_components(config, Arc::new(transport), Arc::new(SystemClock))
    }

    /// Creates a provider with an explicit transport and clock.
    pub fn with_components(
        config: TokenProviderConfig,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> GenAiResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            clock,
            cached_token: Mutex::new(None),
        })
    }

    /// Token endpoint this provider posts to.
    pub fn token_endpoint(&self) -> &str {
        &self.config.token_endpoint
    }

    async fn refresh(&self) -> Result<CachedToken, AuthenticationError> {
        let form = serde_urlencoded::to_string(RefreshRequest {
            client_id: &self.config.client_id,
            client_secret: self.config.client_secret.expose_secret(),
            refresh_token: self.config.refresh_token.expose_secret(),
            grant_type: "refresh_token",
        })
        .map_err(|e| AuthenticationError::RefreshFailed {
            message: format!("Failed to encode refresh request: {e}"),
        })?;

        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        headers.insert("accept".to_string(), "application/json".to_string());

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.config.token_endpoint.clone(),
            headers,
            body: Some(Bytes::from(form)),
        };

        debug!(endpoint = %self.config.token_endpoint, "Refreshing OAuth2 access token");

        let response = self.transport.send(request).await.map_err(|e| {
            AuthenticationError::RefreshFailed {
                message: format!("HTTP request failed: {e}"),
            }
        })?;

        if !response.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            return Err(map_token_error(response.status, &body));
        }

        let parsed: RefreshResponse = serde_json::from_slice(&response.body).map_err(|e| {
            AuthenticationError::RefreshFailed {
                message: format!("Failed to parse token response: {e}"),
            }
        })?;

        let access_token = parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthenticationError::MissingAccessToken)?;

        let expires_in = lifetime_seconds(parsed.expires_in.as_ref());
        let expires_at = expiry_epoch_seconds(self.clock.now_epoch_seconds(), expires_in);

        info!(expires_in, expires_at, "OAuth2 access token refreshed");

        Ok(CachedToken {
            access_token: SecretString::new(access_token),
            expires_at,
        })
    }
}

#[async_trait]
impl TokenProvider for OAuth2TokenProvider {
    async fn get_access_token(&self) -> GenAiResult<String> {
        let mut cached = self.cached_token.lock().await;

        let now = self.clock.now_epoch_seconds();
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid_at(now)) {
            return Ok(token.access_token.expose_secret().clone());
        }

        let token = self.refresh().await.map_err(|e| {
            warn!(error = %e, "OAuth2 token refresh failed");
            e
        })?;
        let value = token.access_token.expose_secret().clone();
        *cached = Some(token);

        Ok(value)
    }

    async fn invalidate(&self) {
        let mut cached = self.cached_token.lock().await;
        if cached.take().is_some() {
            debug!("Cached OAuth2 access token invalidated");
        }
    }
}

impl std::fmt::Debug for OAuth2TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2TokenProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
