//! Integration tests for the generative client.

use async_trait::async_trait;
use bytes::Bytes;
use integrations_generative_ai::media::{ImageLoader, LoadedImage};
use integrations_generative_ai::mocks::{MockHttpTransport, StaticTokenProvider};
use integrations_generative_ai::transport::{HttpMethod, TransportError};
use integrations_generative_ai::{
    ApiError, ClientConfig, ConfigurationError, GenAiError, GenAiResult, GenerativeClient,
    InvalidArgumentError, NoopLogger, NotFoundError, OperationResult, RequestOptions,
    UnsupportedOperationError,
};
use once_cell::sync::OnceCell;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Weak};

const API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
    })
}

fn api_key_config(model: &str) -> ClientConfig {
    ClientConfig::builder()
        .api_key(SecretString::new("test-key".into()))
        .model(model)
        .build()
        .unwrap()
}

/// Helper to create a client over a mock transport.
fn create_test_client(transport: Arc<MockHttpTransport>, config: ClientConfig) -> GenerativeClient {
    GenerativeClient::builder(config)
        .transport(transport)
        .logger(Arc::new(NoopLogger))
        .build()
        .unwrap()
}

#[test]
fn test_construction_requires_credential_and_model() {
    let no_credential = ClientConfig::builder().model("gemini-1.5-flash").build();
    assert!(matches!(
        no_credential,
        Err(GenAiError::Configuration(ConfigurationError::MissingCredential))
    ));

    let no_model = ClientConfig::builder()
        .api_key(SecretString::new("test-key".into()))
        .build();
    assert!(matches!(
        no_model,
        Err(GenAiError::Configuration(ConfigurationError::MissingModel))
    ));
}

#[tokio::test]
async fn test_generate_text_with_api_key() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, text_response("OK"));
    let client = create_test_client(transport.clone(), api_key_config("gemini-1.5-flash"));

    let result = client.generate_text("Hello", RequestOptions::default()).await.unwrap();

    assert_eq!(result, OperationResult::Text { text: "OK".to_string() });
    transport.verify_request_count(1);
    transport.verify_request(0, HttpMethod::Post, "/models/gemini-1.5-flash:generateContent");
    transport.verify_header(0, "content-type", "application/json");

    let request = transport.last_request().unwrap();
    assert_eq!(
        request.url,
        format!("{API_URL}/models/gemini-1.5-flash:generateContent?key=test-key")
    );
    assert!(request.header("authorization").is_none());
    assert_eq!(
        transport.request_json(0).unwrap(),
        json!({"contents": [{"role": "user", "parts": [{"text": "Hello"}]}]})
    );
}

#[tokio::test]
async fn test_missing_candidates_falls_back() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, json!({}));
    let client = create_test_client(transport, api_key_config("gemini-1.5-flash"));

    let result = client.generate_text("Hello", RequestOptions::default()).await.unwrap();
    assert_eq!(result.as_text(), Some("No response"));
}

#[tokio::test]
async fn test_raw_result_returns_payload() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, text_response("OK"));
    let client = create_test_client(transport, api_key_config("gemini-1.5-flash"));

    let result = client
        .generate_text("Hello", RequestOptions::default().raw())
        .await
        .unwrap();
    assert_eq!(result.into_raw(), Some(text_response("OK")));
}

#[tokio::test]
async fn test_system_instruction_prepended_to_generate_text_only() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, text_response("a"));
    transport.enqueue_json_response(200, text_response("b"));
    let client = create_test_client(transport.clone(), api_key_config("gemini-1.5-flash"));

    client.set_system_instruction("You are terse.");
    client.generate_text("Hi", RequestOptions::default()).await.unwrap();
    client.chat(&["one", "two"], RequestOptions::default()).await.unwrap();

    assert_eq!(
        transport.request_json(0).unwrap(),
        json!({"contents": [
            {"role": "system", "parts": [{"text": "You are terse."}]},
            {"role": "user", "parts": [{"text": "Hi"}]}
        ]})
    );
    assert_eq!(
        transport.request_json(1).unwrap(),
        json!({"contents": [
            {"parts": [{"text": "one"}]},
            {"parts": [{"text": "two"}]}
        ]})
    );
}

#[tokio::test]
async fn test_system_instruction_from_config() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, text_response("a"));
    let config = ClientConfig::builder()
        .api_key(SecretString::new("test-key".into()))
        .model("gemini-1.5-flash")
        .system_instruction("Answer in French.")
        .build()
        .unwrap();
    let client = create_test_client(transport.clone(), config);

    client.generate_text("Hi", RequestOptions::default()).await.unwrap();
    let body = transport.request_json(0).unwrap();
    assert_eq!(body["contents"][0]["role"], "system");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Answer in French.");
}

#[tokio::test]
async fn test_set_model_and_per_call_override() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, text_response("a"));
    transport.enqueue_json_response(200, text_response("b"));
    let client = create_test_client(transport.clone(), api_key_config("gemini-1.5-flash"));

    client.set_model("gemini-1.5-pro").unwrap();
    assert_eq!(client.model(), "gemini-1.5-pro");

    client
        .generate_text("x", RequestOptions::default().with_model("gemini-2.0-flash"))
        .await
        .unwrap();
    assert_eq!(client.model(), "gemini-1.5-pro");

    client.generate_text("y", RequestOptions::default()).await.unwrap();

    transport.verify_request(0, HttpMethod::Post, "/models/gemini-2.0-flash:generateContent");
    transport.verify_request(1, HttpMethod::Post, "/models/gemini-1.5-pro:generateContent");
}

#[tokio::test]
async fn test_models_prefix_is_normalized() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, text_response("a"));
    let client = create_test_client(transport.clone(), api_key_config("models/gemini-1.5-flash"));

    client.generate_text("x", RequestOptions::default()).await.unwrap();
    transport.verify_request(0, HttpMethod::Post, "/models/gemini-1.5-flash:generateContent");
    assert!(!transport.last_request().unwrap().url.contains("models/models/"));
}

#[tokio::test]
async fn test_bearer_credential_wins_over_api_key() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, text_response("a"));
    transport.enqueue_json_response(200, json!({"embedding": [0.1]}));
    let credential = Arc::new(StaticTokenProvider::new("access-123"));
    let config = ClientConfig::builder()
        .api_key(SecretString::new("test-key".into()))
        .credential(credential.clone())
        .model("gemini-1.5-flash")
        .build()
        .unwrap();
    let client = create_test_client(transport.clone(), config);

    client.generate_text("x", RequestOptions::default()).await.unwrap();
    client.embed("y", RequestOptions::default()).await.unwrap();

    for index in 0..2 {
        transport.verify_header(index, "Authorization", "Bearer access-123");
    }
    for request in transport.get_requests() {
        assert!(!request.url.contains("key="));
    }
    assert_eq!(credential.call_count(), 2);
}

#[tokio::test]
async fn test_unauthorized_invalidates_credential() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(
        401,
        json!({"error": {"code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED"}}),
    );
    let credential = Arc::new(StaticTokenProvider::new("stale"));
    let config = ClientConfig::builder()
        .credential(credential.clone())
        .model("gemini-1.5-flash")
        .build()
        .unwrap();
    let client = create_test_client(transport, config);

    let error = client.generate_text("x", RequestOptions::default()).await.unwrap_err();
    assert_eq!(
        error.service_message(),
        Some("Request had invalid authentication credentials.")
    );
    assert_eq!(credential.invalidation_count(), 1);
}

#[tokio::test]
async fn test_error_payload_becomes_api_error() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(
        400,
        json!({"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}),
    );
    let client = create_test_client(transport, api_key_config("gemini-1.5-flash"));

    let error = client.generate_text("x", RequestOptions::default()).await.unwrap_err();
    assert_eq!(
        error,
        GenAiError::Api(ApiError::Service {
            message: "API key not valid. Please pass a valid API key.".to_string(),
            code: Some(400),
            status: Some("INVALID_ARGUMENT".to_string()),
        })
    );
    assert_eq!(error.error_code(), "GENAI_API");
}

#[tokio::test]
async fn test_transport_failure_becomes_api_error() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_error(TransportError::Timeout);
    let client = create_test_client(transport, api_key_config("gemini-1.5-flash"));

    let error = client.chat(&["hi"], RequestOptions::default()).await.unwrap_err();
    assert!(matches!(error, GenAiError::Api(ApiError::Transport { .. })));
}

#[tokio::test]
async fn test_missing_image_file_makes_no_request() {
    let transport = Arc::new(MockHttpTransport::new());
    let client = create_test_client(transport.clone(), api_key_config("gemini-pro"));
    let dir = tempfile::tempdir().unwrap();

    let error = client
        .generate_from_image_file(dir.path().join("missing.jpg"), "What is this?", RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(error, GenAiError::NotFound(NotFoundError::ImageFile { .. })));
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_non_vision_model_rejects_image_file() {
    let transport = Arc::new(MockHttpTransport::new());
    let client = create_test_client(transport.clone(), api_key_config("gemini-pro"));
    let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();

    let error = client
        .generate_from_image_file(file.path(), "What is this?", RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        GenAiError::UnsupportedOperation(UnsupportedOperationError::VisionNotSupported {
            model: "gemini-pro".to_string(),
        })
    );
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_image_file_sends_inline_data() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, text_response("A cat"));
    let client = create_test_client(transport.clone(), api_key_config("gemini-1.5-flash"));
    let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
    file.write_all(b"\x89PNG\r\n\x1a\n").unwrap();

    let result = client
        .generate_from_image_file(file.path(), "What is this?", RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(result.as_text(), Some("A cat"));
    assert_eq!(
        transport.request_json(0).unwrap(),
        json!({"contents": [{"parts": [
            {"text": "What is this?"},
            {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
        ]}]})
    );
}

#[tokio::test]
async fn test_vision_override_applies_to_image_calls() {
    let transport = Arc::new(MockHttpTransport::new());
    let client = create_test_client(transport.clone(), api_key_config("gemini-1.5-flash"));

    let error = client
        .generate_from_image_url(
            "https://example.com/cat.jpg",
            "What is this?",
            RequestOptions::default().with_model("gemini-pro"),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, GenAiError::UnsupportedOperation(_)));
    transport.verify_request_count(0);
}

/// Loader that switches the client's model while the image is being read.
struct ModelSwitchingLoader {
    client: OnceCell<Weak<GenerativeClient>>,
    switch_to: &'static str,
}

#[async_trait]
impl ImageLoader for ModelSwitchingLoader {
    async fn exists(&self, _path: &Path) -> bool {
        true
    }

    async fn load(&self, _path: &Path) -> GenAiResult<LoadedImage> {
        if let Some(client) = self.client.get().and_then(Weak::upgrade) {
            client.set_model(self.switch_to)?;
        }
        Ok(LoadedImage {
            mime_type: "image/png".to_string(),
            data: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
        })
    }
}

#[tokio::test]
async fn test_image_file_uses_model_checked_for_vision() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, text_response("A cat"));
    let loader = Arc::new(ModelSwitchingLoader {
        client: OnceCell::new(),
        switch_to: "gemini-pro",
    });
    let client = Arc::new(
        GenerativeClient::builder(api_key_config("gemini-1.5-flash"))
            .transport(transport.clone())
            .logger(Arc::new(NoopLogger))
            .image_loader(loader.clone())
            .build()
            .unwrap(),
    );
    loader.client.set(Arc::downgrade(&client)).unwrap();

    let result = client
        .generate_from_image_file("cat.png", "What is this?", RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(result, OperationResult::Text { text: "A cat".to_string() });
    assert_eq!(client.model(), "gemini-pro");
    transport.verify_request_count(1);
    transport.verify_request(0, HttpMethod::Post, "/models/gemini-1.5-flash:generateContent");
}

#[tokio::test]
async fn test_unparseable_base_url_is_reported() {
    let transport = Arc::new(MockHttpTransport::new());
    let mut config = api_key_config("gemini-1.5-flash");
    config.base_url = "not a url".to_string();
    let client = create_test_client(transport.clone(), config);

    let error = client
        .generate_text("Hello", RequestOptions::default())
        .await
        .unwrap_err();

    match error {
        GenAiError::Configuration(ConfigurationError::InvalidBaseUrl { url }) => {
            assert!(url.starts_with("not a url"), "unexpected url: {url}");
            assert!(url.ends_with("/models/gemini-1.5-flash:generateContent"));
        }
        other => panic!("expected InvalidBaseUrl, got {other:?}"),
    }
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_malformed_image_url() {
    let transport = Arc::new(MockHttpTransport::new());
    let client = create_test_client(transport.clone(), api_key_config("gemini-1.5-flash"));

    let error = client
        .generate_from_image_url("not a url", "What is this?", RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(error, GenAiError::InvalidArgument(InvalidArgumentError::MalformedUrl { .. })));
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_image_url_download_failure() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_error(TransportError::Connection("connection refused".into()));
    let client = create_test_client(transport.clone(), api_key_config("gemini-1.5-flash"));

    let error = client
        .generate_from_image_url("https://unreachable.invalid/cat.jpg", "What?", RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(error, GenAiError::NotFound(NotFoundError::ImageDownload { .. })));
    transport.verify_request_count(1);
    transport.verify_request(0, HttpMethod::Get, "unreachable.invalid");
}

#[tokio::test]
async fn test_image_url_non_success_status() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_body(404, "missing");
    let client = create_test_client(transport.clone(), api_key_config("gemini-1.5-flash"));

    let error = client
        .generate_from_image_url("https://example.com/cat.jpg", "What?", RequestOptions::default())
        .await
        .unwrap_err();

    match error {
        GenAiError::NotFound(NotFoundError::ImageDownload { reason, .. }) => {
            assert_eq!(reason, "HTTP 404");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    transport.verify_request_count(1);
}

#[tokio::test]
async fn test_image_url_downloads_then_generates() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_body(200, &b"imgdata"[..]);
    transport.enqueue_json_response(200, text_response("A dog"));
    let client = create_test_client(transport.clone(), api_key_config("gemini-1.5-flash"));

    let result = client
        .generate_from_image_url("https://example.com/dog.png", "Describe", RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(result.as_text(), Some("A dog"));
    transport.verify_request(0, HttpMethod::Get, "https://example.com/dog.png");
    transport.verify_request(1, HttpMethod::Post, ":generateContent");
    assert_eq!(
        transport.request_json(1).unwrap(),
        json!({"contents": [{"parts": [
            {"text": "Describe"},
            {"inlineData": {"mimeType": "image/jpeg", "data": "aW1nZGF0YQ=="}}
        ]}]})
    );
}

#[tokio::test]
async fn test_generate_image() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, json!({"artifacts": [{"imageUri": "https://img.example.com/1.png"}]}));
    transport.enqueue_json_response(200, json!({"artifacts": []}));
    let client = create_test_client(transport.clone(), api_key_config("imagen-3.0"));

    let result = client
        .generate_image("a lighthouse", 1024, 768, RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(result.as_image_uri(), Some("https://img.example.com/1.png"));

    let fallback = client
        .generate_image("a lighthouse", 1024, 768, RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(fallback.as_image_uri(), Some("No image generated"));

    transport.verify_request(0, HttpMethod::Post, "/models/imagen-3.0:generateImage");
    assert_eq!(
        transport.request_json(0).unwrap(),
        json!({
            "prompt": {"text": "a lighthouse"},
            "imageConfig": {"width": 1024, "height": 768, "mimeType": "image/png"}
        })
    );
}

#[tokio::test]
async fn test_embed() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, json!({"embedding": {"value": [0.5, -0.25]}}));
    transport.enqueue_json_response(200, json!({"unexpected": true}));
    let client = create_test_client(transport.clone(), api_key_config("embedding-gecko-001"));

    let result = client.embed("hello", RequestOptions::default()).await.unwrap();
    assert_eq!(result.as_embedding(), Some(&[0.5_f32, -0.25][..]));

    let empty = client.embed("hello", RequestOptions::default()).await.unwrap();
    assert_eq!(empty.as_embedding(), Some(&[][..]));

    transport.verify_request(0, HttpMethod::Post, "/models/embedding-gecko-001:embedText");
    assert_eq!(transport.request_json(0).unwrap(), json!({"text": "hello"}));
}

#[tokio::test]
async fn test_embed_raw() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, json!({"embedding": [1.0]}));
    let client = create_test_client(transport, api_key_config("embedding-gecko-001"));

    let result = client.embed("hello", RequestOptions::default().raw()).await.unwrap();
    assert_eq!(result.as_raw(), Some(&json!({"embedding": [1.0]})));
}
