//! Integration tests for provider failures and their classification

use crate::integration::mock_server::MockServerFixture;
use quillstream::{ErrorCategory, GenerationOptions, Generator, MemoryCredentials, Message};
use std::sync::Arc;

async fn stream_error(fixture: &MockServerFixture) -> quillstream::ClassifiedError {
    let mut calls = 0;
    let err = fixture
        .generator()
        .generate_stream(&[Message::user("hi")], GenerationOptions::new(), |_| {
            calls += 1
        })
        .await
        .unwrap_err();
    assert_eq!(calls, 0, "no fragments before a rejected request");
    err
}

#[tokio::test]
async fn test_401_is_auth_rejected() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error_response(
            401,
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#,
        )
        .await;

    let err = stream_error(&fixture).await;
    assert_eq!(err.category, ErrorCategory::AuthRejected);
    assert!(err.message.contains("Incorrect API key provided"));
    assert!(!err.category.is_silent());
}

#[tokio::test]
async fn test_429_is_rate_limited() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error_response(
            429,
            r#"{"error":{"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#,
        )
        .await;

    let err = stream_error(&fixture).await;
    assert_eq!(err.category, ErrorCategory::RateLimited);
    assert!(err.message.contains("Resource has been exhausted"));
}

#[tokio::test]
async fn test_413_is_context_too_large() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error_response(413, "request entity too large")
        .await;

    let err = stream_error(&fixture).await;
    assert_eq!(err.category, ErrorCategory::ContextTooLarge);
}

#[tokio::test]
async fn test_unrecognised_failure_keeps_raw_message() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error_response(
            500,
            r#"{"error":{"message":"The model is overloaded","code":"server_error"}}"#,
        )
        .await;

    let err = fixture
        .generator()
        .generate(&[Message::user("hi")], GenerationOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::Unknown);
    assert_eq!(err.message, "Provider error (HTTP 500): The model is overloaded");
}

#[tokio::test]
async fn test_same_failure_classifies_identically() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error_response(401, r#"{"error":{"message":"bad key"}}"#)
        .await;

    let first = stream_error(&fixture).await;
    let second = stream_error(&fixture).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unreachable_host_is_network_failure() {
    let generator = Generator::builder()
        .env_overrides(false)
        .credentials(Arc::new(MemoryCredentials::with_credential("sk-test")))
        .base_url_override("http://127.0.0.1:1")
        .timeout_secs(2)
        .build()
        .unwrap();

    let err = generator
        .generate(&[Message::user("hi")], GenerationOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::NetworkFailure);
}
