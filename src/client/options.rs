//! Per-call request options.

/// Options applied to a single client call.
///
/// ```
/// use integrations_generative_ai::RequestOptions;
///
/// let opts = RequestOptions::default().with_model("gemini-1.5-pro").raw();
/// assert_eq!(opts.model.as_deref(), Some("gemini-1.5-pro"));
/// assert!(opts.raw);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Model used for this call only; the client default is left untouched.
    pub model: Option<String>,
    /// Return the full response payload instead of the extracted value.
    pub raw: bool,
}

impl RequestOptions {
    /// Default options: client model, extracted result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the model for this call.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Requests the raw response payload.
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Sets the raw flag explicitly.
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }
}
