//! Vision capability policy.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::transport::endpoints::normalize_model_name;

static KNOWN_VISION_MODELS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "gemini-pro-vision",
        "gemini-1.0-pro-vision",
        "gemini-1.0-pro-vision-latest",
        "gemini-1.0-pro-vision-001",
        "gemini-1.5-flash",
        "gemini-1.5-flash-latest",
        "gemini-1.5-flash-001",
        "gemini-1.5-flash-002",
        "gemini-1.5-flash-8b",
        "gemini-1.5-flash-8b-latest",
        "gemini-1.5-pro",
        "gemini-1.5-pro-latest",
        "gemini-1.5-pro-001",
        "gemini-1.5-pro-002",
        "gemini-2.0-flash",
        "gemini-2.0-flash-001",
        "gemini-2.0-flash-exp",
        "gemini-2.0-flash-lite",
        "gemini-2.5-flash",
        "gemini-2.5-pro",
    ]
    .into_iter()
    .collect()
});

/// Decides which models accept image input.
///
/// Only models in a known allow-list qualify; callers can add ids for models
/// released later.
#[derive(Debug, Clone, Default)]
pub struct VisionPolicy {
    extra: HashSet<String>,
}

impl VisionPolicy {
    /// Policy with only the built-in vision models.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds model ids to the allow-list.
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra.extend(models.into_iter().map(|m| {
            let model: String = m.into();
            normalize_model_name(model.trim()).to_string()
        }));
        self
    }

    /// Whether `model` accepts image input. A leading `models/` is ignored.
    pub fn supports(&self, model: &str) -> bool {
        let model = normalize_model_name(model.trim());
        KNOWN_VISION_MODELS.contains(model) || self.extra.contains(model)
    }
}
