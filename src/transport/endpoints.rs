//! Endpoint path constants and builder functions for the generative API.

/// Base path for models endpoints.
pub const MODELS: &str = "/models";

/// Text and multimodal content generation.
pub const GENERATE_CONTENT: &str = "generateContent";

/// Image generation.
pub const GENERATE_IMAGE: &str = "generateImage";

/// Text embeddings.
pub const EMBED_TEXT: &str = "embedText";

/// Strips a leading `models/` so both `gemini-pro` and `models/gemini-pro` work.
pub fn normalize_model_name(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

/// Constructs the path for an action on a model.
///
/// # Example
///
/// ```
/// use integrations_generative_ai::transport::endpoints;
///
/// let path = endpoints::model_action("gemini-1.5-flash", endpoints::GENERATE_CONTENT);
/// assert_eq!(path, "/models/gemini-1.5-flash:generateContent");
/// ```
pub fn model_action(model: &str, action: &str) -> String {
    format!("{}/{}:{}", MODELS, normalize_model_name(model), action)
}

/// Joins a base URL and an endpoint path without doubling the separator.
pub fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
