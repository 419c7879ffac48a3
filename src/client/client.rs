//! Generative client implementation.

use bytes::Bytes;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{
    map_response_body, ConfigurationError, GenAiError, GenAiResult, NotFoundError,
    UnsupportedOperationError,
};
use crate::media::{validate_image_url, ImageLoader, URL_IMAGE_MIME_TYPE};
use crate::observability::Logger;
use crate::transport::{endpoints, HttpMethod, HttpRequest, HttpTransport};
use crate::types::{
    extract_embedding, extract_image_uri, extract_text, Content, EmbedTextRequest,
    GenerateContentRequest, GenerateImageRequest, OperationResult, Part,
};

use super::builder::GenerativeClientBuilder;
use super::options::RequestOptions;
use super::vision::VisionPolicy;

/// Client for the generative language API.
///
/// Every operation issues a single authenticated POST to
/// `{base_url}/models/{model}:{action}`. The default model and system
/// instruction can be changed at runtime; per-call overrides go through
/// [`RequestOptions`].
///
/// # Example
///
/// ```no_run
/// use integrations_generative_ai::{ClientConfig, GenerativeClient, RequestOptions};
/// use secrecy::SecretString;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::builder()
///     .api_key(SecretString::new("your-api-key".into()))
///     .model("gemini-1.5-flash")
///     .build()?;
/// let client = GenerativeClient::new(config)?;
///
/// let answer = client.generate_text("Hello", RequestOptions::default()).await?;
/// println!("{}", answer.as_text().unwrap_or_default());
/// # Ok(())
/// # }
/// ```
pub struct GenerativeClient {
    config: ClientConfig,
    model: RwLock<String>,
    system_instruction: RwLock<Option<String>>,
    transport: Arc<dyn HttpTransport>,
    logger: Arc<dyn Logger>,
    image_loader: Arc<dyn ImageLoader>,
    vision: VisionPolicy,
}

impl GenerativeClient {
    /// Creates a builder for the given configuration.
    pub fn builder(config: ClientConfig) -> GenerativeClientBuilder {
        GenerativeClientBuilder::from_config(config)
    }

    /// Creates a client with the default transport, logger and image loader.
    pub fn new(config: ClientConfig) -> GenAiResult<Self> {
        Self::builder(config).build()
    }

    /// Creates a client from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub(super) fn from_parts(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        logger: Arc<dyn Logger>,
        image_loader: Arc<dyn ImageLoader>,
        vision: VisionPolicy,
    ) -> Self {
        Self {
            model: RwLock::new(config.model.clone()),
            system_instruction: RwLock::new(config.system_instruction.clone()),
            config,
            transport,
            logger,
            image_loader,
            vision,
        }
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The vision policy used to gate image operations.
    pub fn vision_policy(&self) -> &VisionPolicy {
        &self.vision
    }

    /// Current default model.
    pub fn model(&self) -> String {
        self.model.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replaces the default model for subsequent calls.
    pub fn set_model(&self, model: impl Into<String>) -> GenAiResult<()> {
        let model = model.into().trim().to_string();
        if model.is_empty() {
            return Err(ConfigurationError::MissingModel.into());
        }
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = model;
        Ok(())
    }

    /// Current system instruction, if any.
    pub fn system_instruction(&self) -> Option<String> {
        self.system_instruction
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sets the instruction prepended to `generate_text` calls.
    ///
    /// Surrounding whitespace is trimmed; an empty instruction clears it.
    pub fn set_system_instruction(&self, instruction: impl Into<String>) {
        let instruction = instruction.into().trim().to_string();
        *self
            .system_instruction
            .write()
            .unwrap_or_else(PoisonError::into_inner) =
            (!instruction.is_empty()).then_some(instruction);
    }

    /// Removes the system instruction.
    pub fn clear_system_instruction(&self) {
        *self
            .system_instruction
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Generates text from a single prompt.
    ///
    /// When a system instruction is set it is sent first, with role `system`.
    pub async fn generate_text(
        &self,
        prompt: &str,
        options: RequestOptions,
    ) -> GenAiResult<OperationResult> {
        let mut contents = Vec::with_capacity(2);
        if let Some(instruction) = self.system_instruction() {
            contents.push(Content::system(instruction));
        }
        contents.push(Content::user(prompt));

        let model = self.resolve_model(&options);
        self.generate_content(&model, contents, options.raw).await
    }

    /// Sends each message as its own untagged content entry.
    pub async fn chat<S>(&self, messages: &[S], options: RequestOptions) -> GenAiResult<OperationResult>
    where
        S: AsRef<str> + Sync,
    {
        let contents = messages
            .iter()
            .map(|m| Content::untagged(m.as_ref()))
            .collect();

        let model = self.resolve_model(&options);
        self.generate_content(&model, contents, options.raw).await
    }

    /// Describes a local image file.
    ///
    /// Fails with a not-found error when the file is missing and with an
    /// unsupported-operation error when the model has no vision support;
    /// neither case touches the network.
    pub async fn generate_from_image_file(
        &self,
        path: impl AsRef<Path> + Send,
        prompt: &str,
        options: RequestOptions,
    ) -> GenAiResult<OperationResult> {
        let path = path.as_ref();
        if !self.image_loader.exists(path).await {
            return Err(NotFoundError::ImageFile {
                path: path.display().to_string(),
            }
            .into());
        }

        let model = self.resolve_model(&options);
        self.ensure_vision(&model)?;

        let image = self.image_loader.load(path).await?;
        let contents = vec![Content {
            role: None,
            parts: vec![
                Part::text(prompt),
                Part::inline_data(image.mime_type.clone(), image.to_base64()),
            ],
        }];

        self.generate_content(&model, contents, options.raw).await
    }

    /// Downloads an image and describes it.
    ///
    /// The downloaded bytes are always labelled `image/jpeg`.
    pub async fn generate_from_image_url(
        &self,
        image_url: &str,
        prompt: &str,
        options: RequestOptions,
    ) -> GenAiResult<OperationResult> {
        let model = self.resolve_model(&options);
        self.ensure_vision(&model)?;

        let url = validate_image_url(image_url)?;
        let data = self.download_image(&url).await?;

        let contents = vec![Content {
            role: None,
            parts: vec![
                Part::text(prompt),
                Part::inline_data(URL_IMAGE_MIME_TYPE, base64_encode(&data)),
            ],
        }];

        self.generate_content(&model, contents, options.raw).await
    }

    /// Generates a PNG image and returns its URI.
    pub async fn generate_image(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
        options: RequestOptions,
    ) -> GenAiResult<OperationResult> {
        let model = self.resolve_model(&options);
        let body = GenerateImageRequest::new(prompt, width, height);
        let response = self.request(endpoints::GENERATE_IMAGE, &model, &body).await?;

        Ok(if options.raw {
            OperationResult::Raw { payload: response }
        } else {
            OperationResult::Image {
                uri: extract_image_uri(&response),
            }
        })
    }

    /// Computes an embedding vector for `text`.
    pub async fn embed(&self, text: &str, options: RequestOptions) -> GenAiResult<OperationResult> {
        let model = self.resolve_model(&options);
        let body = EmbedTextRequest { text: text.to_string() };
        let response = self.request(endpoints::EMBED_TEXT, &model, &body).await?;

        Ok(if options.raw {
            OperationResult::Raw { payload: response }
        } else {
            OperationResult::Embedding {
                vector: extract_embedding(&response),
            }
        })
    }

    /// Posts `contents` to `model`, which the caller has already resolved.
    async fn generate_content(
        &self,
        model: &str,
        contents: Vec<Content>,
        raw: bool,
    ) -> GenAiResult<OperationResult> {
        let body = GenerateContentRequest { contents };
        let response = self.request(endpoints::GENERATE_CONTENT, model, &body).await?;

        Ok(if raw {
            OperationResult::Raw { payload: response }
        } else {
            OperationResult::Text {
                text: extract_text(&response),
            }
        })
    }

    fn resolve_model(&self, options: &RequestOptions) -> String {
        options
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map_or_else(|| self.model(), ToString::to_string)
    }

    fn ensure_vision(&self, model: &str) -> GenAiResult<()> {
        if self.vision.supports(model) {
            Ok(())
        } else {
            Err(UnsupportedOperationError::VisionNotSupported {
                model: model.to_string(),
            }
            .into())
        }
    }

    async fn download_image(&self, url: &Url) -> GenAiResult<Bytes> {
        let download_error = |reason: String| NotFoundError::ImageDownload {
            url: url.to_string(),
            reason,
        };

        let request = HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: HashMap::new(),
            body: None,
        };

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| download_error(e.to_string()))?;

        if !response.is_success() {
            return Err(download_error(format!("HTTP {}", response.status)).into());
        }

        self.logger.debug(
            "Downloaded image",
            json!({ "url": url.as_str(), "bytes": response.body.len() }),
        );

        Ok(response.body)
    }

    async fn request<B: Serialize + Sync>(
        &self,
        action: &str,
        model: &str,
        body: &B,
    ) -> GenAiResult<Value> {
        let request_id = Uuid::new_v4().to_string();
        let path = endpoints::model_action(model, action);
        let endpoint = endpoints::join(&self.config.base_url, &path);
        let mut url = Url::parse(&endpoint)
            .map_err(|_| ConfigurationError::InvalidBaseUrl { url: endpoint.clone() })?;

        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        let auth_scheme = if let Some(credential) = &self.config.credential {
            let token = credential.get_access_token().await?;
            headers.insert("authorization".to_string(), format!("Bearer {token}"));
            "bearer"
        } else if let Some(api_key) = &self.config.api_key {
            url.query_pairs_mut().append_pair("key", api_key.expose_secret());
            "api_key"
        } else {
            return Err(ConfigurationError::MissingCredential.into());
        };

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers,
            body: Some(Bytes::from(serde_json::to_vec(body)?)),
        };

        self.logger.debug(
            "Sending request",
            json!({
                "request_id": request_id,
                "action": action,
                "model": endpoints::normalize_model_name(model),
                "auth_scheme": auth_scheme,
            }),
        );

        let started = Instant::now();
        let response = self.transport.send(request).await.map_err(|e| {
            self.logger.error(
                "Transport failure",
                json!({ "request_id": request_id, "error": e.to_string() }),
            );
            GenAiError::from(e)
        })?;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match map_response_body(response.status, &response.body) {
            Ok(value) => {
                self.logger.info(
                    "Request completed",
                    json!({
                        "request_id": request_id,
                        "action": action,
                        "status": response.status,
                        "elapsed_ms": elapsed_ms,
                    }),
                );
                Ok(value)
            }
            Err(error) => {
                self.logger.warn(
                    "Request failed",
                    json!({
                        "request_id": request_id,
                        "action": action,
                        "status": response.status,
                        "elapsed_ms": elapsed_ms,
                        "error": error.to_string(),
                    }),
                );
                if response.status == 401 {
                    if let Some(credential) = &self.config.credential {
                        credential.invalidate().await;
                    }
                }
                Err(GenAiError::Api(error))
            }
        }
    }
}

fn base64_encode(data: &[u8]) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    STANDARD.encode(data)
}

impl std::fmt::Debug for GenerativeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerativeClient")
            .field("config", &self.config)
            .field("model", &self.model())
            .field("vision", &self.vision)
            .finish_non_exhaustive()
    }
}

/// Creates a client from configuration.
pub fn create_client(config: ClientConfig) -> GenAiResult<GenerativeClient> {
    GenerativeClient::new(config)
}

/// Creates a client from environment variables.
pub fn create_client_from_env() -> GenAiResult<GenerativeClient> {
    GenerativeClient::from_env()
}
