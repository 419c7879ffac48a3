//! Request bodies for each API action.

use serde::{Deserialize, Serialize};

use super::content::Content;

/// MIME type requested for generated images.
pub const GENERATED_IMAGE_MIME_TYPE: &str = "image/png";

/// Body of a generateContent call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateContentRequest {
    /// Conversation contents, in order.
    pub contents: Vec<Content>,
}

/// Body of a generateImage call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    /// Text prompt.
    pub prompt: TextPrompt,
    /// Output image settings.
    pub image_config: ImageConfig,
}

impl GenerateImageRequest {
    /// A PNG image request of the given size.
    pub fn new(prompt: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            prompt: TextPrompt { text: prompt.into() },
            image_config: ImageConfig {
                width,
                height,
                mime_type: GENERATED_IMAGE_MIME_TYPE.to_string(),
            },
        }
    }
}

/// A bare text prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextPrompt {
    /// Prompt text.
    pub text: String,
}

/// Output settings for generated images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Output MIME type.
    pub mime_type: String,
}

/// Body of an embedText call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedTextRequest {
    /// Text to embed.
    pub text: String,
}
