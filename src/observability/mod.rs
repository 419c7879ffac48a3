//! Observability for the generative AI client.

mod logging;

pub use logging::{redact_sensitive_fields, Logger, NoopLogger, StructuredLogger, REDACTED};
