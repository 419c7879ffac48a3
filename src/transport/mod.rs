//! HTTP transport layer for the generative AI client.

mod http;
mod error;
mod reqwest;
pub mod endpoints;

pub use http::{HttpTransport, HttpMethod, HttpRequest, HttpResponse};
pub use error::TransportError;
pub use self::reqwest::ReqwestTransport;
