//! Generative client and its builder.

mod builder;
mod client;
mod options;
mod vision;

pub use builder::{GenerativeClientBuilder, DEFAULT_LOGGER_NAME};
pub use client::{create_client, create_client_from_env, GenerativeClient};
pub use options::RequestOptions;
pub use vision::VisionPolicy;
