//! Operation results and response extraction.

use serde::Serialize;
use serde_json::Value;

/// Returned by text operations when the response has no candidate text.
pub const NO_RESPONSE: &str = "No response";

/// Returned by image generation when the response has no artifact URI.
pub const NO_IMAGE_GENERATED: &str = "No image generated";

/// Result of a client operation, either the shaped value or the raw payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationResult {
    /// Text extracted from the first candidate.
    Text {
        /// The text.
        text: String,
    },
    /// The full response payload, untouched.
    Raw {
        /// Parsed JSON body.
        payload: Value,
    },
    /// An embedding vector.
    Embedding {
        /// Vector components.
        vector: Vec<f32>,
    },
    /// URI of a generated image.
    Image {
        /// Image location.
        uri: String,
    },
}

impl OperationResult {
    /// Text, if this is a `Text` result.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Payload, if this is a `Raw` result.
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Self::Raw { payload } => Some(payload),
            _ => None,
        }
    }

    /// Vector, if this is an `Embedding` result.
    pub fn as_embedding(&self) -> Option<&[f32]> {
        match self {
            Self::Embedding { vector } => Some(vector),
            _ => None,
        }
    }

    /// URI, if this is an `Image` result.
    pub fn as_image_uri(&self) -> Option<&str> {
        match self {
            Self::Image { uri } => Some(uri),
            _ => None,
        }
    }

    /// Consumes the result, returning the payload of a `Raw` result.
    pub fn into_raw(self) -> Option<Value> {
        match self {
            Self::Raw { payload } => Some(payload),
            _ => None,
        }
    }
}

/// `candidates[0].content.parts[0].text`, or [`NO_RESPONSE`].
pub fn extract_text(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .unwrap_or(NO_RESPONSE)
        .to_string()
}

/// `artifacts[0].imageUri`, or [`NO_IMAGE_GENERATED`].
pub fn extract_image_uri(response: &Value) -> String {
    response
        .pointer("/artifacts/0/imageUri")
        .and_then(Value::as_str)
        .unwrap_or(NO_IMAGE_GENERATED)
        .to_string()
}

/// The `embedding` field as floats, or an empty vector.
///
/// Accepts a bare array or an object holding the array under `values` or `value`.
#[allow(clippy::cast_possible_truncation)]
pub fn extract_embedding(response: &Value) -> Vec<f32> {
    let values = match response.get("embedding") {
        Some(Value::Array(values)) => Some(values),
        Some(Value::Object(obj)) => obj
            .get("values")
            .or_else(|| obj.get("value"))
            .and_then(Value::as_array),
        _ => None,
    };

    values
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_f64)
                .map(|v| v as f32)
                .collect()
        })
        .unwrap_or_default()
}
