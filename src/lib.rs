//! # Generative Language API Client
//!
//! Rust client for Google's Generative Language API with API-key or OAuth2
//! refresh-token authentication.
//!
//! ## Features
//!
//! - Text generation with an optional system instruction
//! - Multi-turn chat from plain message lists
//! - Image understanding from local files or URLs, gated to vision-capable models
//! - Image generation and text embeddings
//! - OAuth2 refresh-token exchange with an in-memory, expiry-aware token cache
//! - Raw or extracted results, chosen per call
//! - Secure credential handling with `SecretString`
//! - Mock transport, token provider and clock for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_generative_ai::{create_client, ClientConfig, RequestOptions};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .api_key(SecretString::new("your-api-key".into()))
//!         .model("gemini-1.5-flash")
//!         .build()?;
//!
//!     let client = create_client(config)?;
//!
//!     // Or create from environment variables
//!     // let client = create_client_from_env()?;
//!
//!     let reply = client.generate_text("Say hello", RequestOptions::default()).await?;
//!     println!("{}", reply.as_text().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `client` - Client, builder, per-call options and vision policy
//! - `config` - Configuration types, builder and environment loading
//! - `auth` - Token providers and the clock used for expiry
//! - `transport` - HTTP transport layer and endpoint paths
//! - `error` - Error types and response mapping
//! - `types` - Request bodies, content parts and operation results
//! - `media` - Image loading, MIME detection and URL validation
//! - `observability` - Structured logging with secret redaction

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod observability;
pub mod transport;
pub mod types;

// Development/testing modules - always available for integration tests
pub mod mocks;

// Re-exports for convenience
pub use auth::{Clock, OAuth2TokenProvider, SystemClock, TokenProvider};
pub use client::{
    create_client, create_client_from_env, GenerativeClient, GenerativeClientBuilder,
    RequestOptions, VisionPolicy,
};
pub use config::{
    ClientConfig, ClientConfigBuilder, LogLevel, TokenProviderConfig, DEFAULT_BASE_URL,
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_ENDPOINT,
};
pub use error::{
    // Main error types
    GenAiError,
    GenAiResult,
    // Error categories
    ApiError,
    AuthenticationError,
    ConfigurationError,
    InvalidArgumentError,
    NotFoundError,
    UnsupportedOperationError,
};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
pub use types::{Blob, Content, OperationResult, Part, Role};

// Observability re-exports
pub use observability::{Logger, NoopLogger, StructuredLogger};
