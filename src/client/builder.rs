//! Builder for creating generative client instances.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::GenAiResult;
use crate::media::{FsImageLoader, ImageLoader};
use crate::observability::{Logger, StructuredLogger};
use crate::transport::{HttpTransport, ReqwestTransport};

use super::client::GenerativeClient;
use super::vision::VisionPolicy;

/// Logger name used when no logger is injected.
pub const DEFAULT_LOGGER_NAME: &str = "genai.client";

/// Builder for a [`GenerativeClient`].
///
/// Starts from a validated [`ClientConfig`]; the remaining setters inject
/// collaborators, mainly for testing.
///
/// # Example
///
/// ```no_run
/// use integrations_generative_ai::{ClientConfig, GenerativeClientBuilder};
/// use secrecy::SecretString;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::builder()
///     .api_key(SecretString::new("your-api-key".into()))
///     .model("gemini-1.5-flash")
///     .build()?;
///
/// let client = GenerativeClientBuilder::from_config(config)
///     .vision_models(["gemini-exp-1206"])
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct GenerativeClientBuilder {
    config: ClientConfig,
    vision: VisionPolicy,

    // Injectable dependencies for testing
    transport: Option<Arc<dyn HttpTransport>>,
    logger: Option<Arc<dyn Logger>>,
    image_loader: Option<Arc<dyn ImageLoader>>,
}

impl GenerativeClientBuilder {
    /// Creates a builder from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            vision: VisionPolicy::new(),
            transport: None,
            logger: None,
            image_loader: None,
        }
    }

    /// Sets a custom HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom logger.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Sets a custom image loader.
    pub fn image_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.image_loader = Some(loader);
        self
    }

    /// Adds model ids that accept image input.
    pub fn vision_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vision = self.vision.with_models(models);
        self
    }

    /// Builds the client.
    pub fn build(self) -> GenAiResult<GenerativeClient> {
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(
                self.config.timeout,
                self.config.connect_timeout,
            )?),
        };

        let logger = self.logger.unwrap_or_else(|| {
            Arc::new(StructuredLogger::new(DEFAULT_LOGGER_NAME).with_level(self.config.log_level))
        });

        let image_loader = self
            .image_loader
            .unwrap_or_else(|| Arc::new(FsImageLoader));

        Ok(GenerativeClient::from_parts(
            self.config,
            transport,
            logger,
            image_loader,
            self.vision,
        ))
    }
}
