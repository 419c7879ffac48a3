//! Configuration types for the generative AI client.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::auth::{OAuth2TokenProvider, TokenProvider};
use crate::error::{ConfigurationError, GenAiError, GenAiResult};

/// Default API base URL, including the API version.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when loading configuration from the environment without `GEMINI_MODEL`.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default Google OAuth2 token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Default request timeout (30 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Log level for the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Error level - only errors.
    Error,
    /// Warning level - errors and warnings.
    Warn,
    /// Info level - general information.
    #[default]
    Info,
    /// Debug level - detailed information.
    Debug,
    /// Trace level - very detailed information.
    Trace,
}

/// Configuration for the OAuth2 refresh-token provider.
#[derive(Clone)]
pub struct TokenProviderConfig {
    /// OAuth2 client identifier.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: SecretString,
    /// Long-lived refresh token exchanged for access tokens.
    pub refresh_token: SecretString,
    /// Token endpoint URL.
    pub token_endpoint: String,
    /// Timeout for token requests.
    pub timeout: Duration,
}

impl TokenProviderConfig {
    /// Creates a configuration targeting the default Google token endpoint.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            refresh_token: SecretString::new(refresh_token.into()),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets a custom token endpoint (for testing or non-Google servers).
    pub fn with_token_endpoint(mut self, token_endpoint: impl Into<String>) -> Self {
        self.token_endpoint = token_endpoint.into();
        self
    }

    /// Sets the token request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks that every required field is non-empty and the endpoint parses.
    pub fn validate(&self) -> GenAiResult<()> {
        let required = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("refresh_token", self.refresh_token.expose_secret().as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigurationError::MissingOAuthField { field: field.to_string() }.into());
            }
        }

        Url::parse(&self.token_endpoint).map_err(|_| ConfigurationError::InvalidConfiguration {
            message: format!("invalid token endpoint: {}", self.token_endpoint),
        })?;

        Ok(())
    }

    /// Loads OAuth2 settings from the environment.
    ///
    /// Returns `Ok(None)` when none of the OAuth2 variables are set.
    pub fn from_env() -> GenAiResult<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads OAuth2 settings through an arbitrary key lookup.
    ///
    /// Reads `GEMINI_OAUTH_CLIENT_ID`, `GEMINI_OAUTH_CLIENT_SECRET`,
    /// `GEMINI_OAUTH_REFRESH_TOKEN` and, optionally, `GEMINI_OAUTH_TOKEN_URI`.
    pub fn from_lookup<F>(lookup: F) -> GenAiResult<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let client_id = get("GEMINI_OAUTH_CLIENT_ID");
        let client_secret = get("GEMINI_OAUTH_CLIENT_SECRET");
        let refresh_token = get("GEMINI_OAUTH_REFRESH_TOKEN");

        let (client_id, client_secret, refresh_token) = match (client_id, client_secret, refresh_token) {
            (None, None, None) => return Ok(None),
            (Some(id), Some(secret), Some(token)) => (id, secret, token),
            (id, secret, _) => {
                let field = if id.is_none() {
                    "client_id"
                } else if secret.is_none() {
                    "client_secret"
                } else {
                    "refresh_token"
                };
                return Err(ConfigurationError::MissingOAuthField { field: field.to_string() }.into());
            }
        };

        let mut config = Self::new(client_id, client_secret, refresh_token);
        if let Some(endpoint) = get("GEMINI_OAUTH_TOKEN_URI") {
            config = config.with_token_endpoint(endpoint);
        }
        config.validate()?;
        Ok(Some(config))
    }
}

impl std::fmt::Debug for TokenProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_endpoint", &self.token_endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Configuration for the generative client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Static API key, sent as the `key` query parameter.
    pub api_key: Option<SecretString>,
    /// Default model identifier.
    pub model: String,
    /// Base URL for the API, including the version segment.
    pub base_url: String,
    /// Instruction prepended to every `generate_text` call.
    pub system_instruction: Option<String>,
    /// Bearer-token source; takes precedence over the API key.
    pub credential: Option<Arc<dyn TokenProvider>>,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Log level.
    pub log_level: LogLevel,
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration through an arbitrary key lookup.
    ///
    /// Reads `GEMINI_API_KEY` (falling back to `GOOGLE_API_KEY`), `GEMINI_MODEL`,
    /// `GEMINI_BASE_URL`, `GEMINI_SYSTEM_INSTRUCTION`, `GEMINI_TIMEOUT_SECS` and the
    /// OAuth2 variables read by [`TokenProviderConfig::from_lookup`]. When OAuth2
    /// settings are present an [`OAuth2TokenProvider`] becomes the credential.
    pub fn from_lookup<F>(lookup: F) -> GenAiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder()
            .model(get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()));

        if let Some(api_key) = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")) {
            builder = builder.api_key(SecretString::new(api_key));
        }

        if let Some(base_url) = get("GEMINI_BASE_URL") {
            builder = builder.base_url(&base_url)?;
        }

        if let Some(instruction) = get("GEMINI_SYSTEM_INSTRUCTION") {
            builder = builder.system_instruction(instruction);
        }

        if let Some(raw) = get("GEMINI_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigurationError::InvalidConfiguration {
                message: format!("GEMINI_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"),
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(oauth) = TokenProviderConfig::from_lookup(&lookup)? {
            builder = builder.credential(Arc::new(OAuth2TokenProvider::new(oauth)?));
        }

        builder.build()
    }

    /// Whether a non-empty API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("system_instruction", &self.system_instruction)
            .field("credential", &self.credential.as_ref().map(|_| "<token provider>"))
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Builder for `ClientConfig`.
#[derive(Default)]
pub struct ClientConfigBuilder {
    api_key: Option<SecretString>,
    model: Option<String>,
    base_url: Option<String>,
    system_instruction: Option<String>,
    credential: Option<Arc<dyn TokenProvider>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    log_level: Option<LogLevel>,
}

impl ClientConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the default model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: &str) -> Result<Self, GenAiError> {
        Url::parse(base_url).map_err(|_| ConfigurationError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        Ok(self)
    }

    /// Set the system instruction.
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Set the bearer-token credential.
    pub fn credential(mut self, credential: Arc<dyn TokenProvider>) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Build the configuration.
    ///
    /// Fails unless a credential or a non-empty API key is present and a
    /// non-empty model is set.
    pub fn build(self) -> Result<ClientConfig, GenAiError> {
        let api_key = self
            .api_key
            .filter(|key| !key.expose_secret().trim().is_empty());

        if api_key.is_none() && self.credential.is_none() {
            return Err(ConfigurationError::MissingCredential.into());
        }

        let model = self
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or(ConfigurationError::MissingModel)?;

        let timeout = self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(ClientConfig {
            api_key,
            model,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            system_instruction: self
                .system_instruction
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            credential: self.credential,
            timeout,
            connect_timeout: self
                .connect_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            log_level: self.log_level.unwrap_or_default(),
        })
    }
}
