//! Credential sources for bearer-token authentication.
//!
//! A [`TokenProvider`] hands the client a short-lived access token on demand.
//! [`OAuth2TokenProvider`] implements the Google refresh-token grant with an
//! in-memory cache.
//!
//! ```no_run
//! use integrations_generative_ai::auth::{OAuth2TokenProvider, TokenProvider};
//! use integrations_generative_ai::config::TokenProviderConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OAuth2TokenProvider::new(TokenProviderConfig::new(
//!     "client_id.apps.googleusercontent.com",
//!     "client_secret",
//!     "refresh_token",
//! ))?;
//!
//! let token = provider.get_access_token().await?;
//! # Ok(())
//! # }
//! ```

mod clock;
mod oauth2;

pub use clock::{Clock, SystemClock};
pub use oauth2::{OAuth2TokenProvider, DEFAULT_EXPIRES_IN_SECONDS, TOKEN_EXPIRY_MARGIN_SECONDS};

use async_trait::async_trait;

use crate::error::GenAiResult;

/// Source of bearer access tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a currently valid access token, refreshing it if needed.
    async fn get_access_token(&self) -> GenAiResult<String>;

    /// Drops any cached token so the next call fetches a fresh one.
    async fn invalidate(&self) {}
}
