//! Request and response types for the generative API.

pub mod content;
pub mod output;
pub mod requests;

pub use content::{Blob, Content, Part, Role};
pub use output::{
    extract_embedding, extract_image_uri, extract_text, OperationResult, NO_IMAGE_GENERATED,
    NO_RESPONSE,
};
pub use requests::{
    EmbedTextRequest, GenerateContentRequest, GenerateImageRequest, ImageConfig, TextPrompt,
    GENERATED_IMAGE_MIME_TYPE,
};
