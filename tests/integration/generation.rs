//! Integration tests for single-shot generation

use crate::integration::mock_server::MockServerFixture;
use quillstream::{ErrorCategory, GenerationOptions, MemoryCredentials, Message};
use std::sync::Arc;

#[tokio::test]
async fn test_generate_returns_first_choice() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(
            r#"{"choices":[
                {"index":0,"message":{"role":"assistant","content":"The Salt Road"}},
                {"index":1,"message":{"role":"assistant","content":"ignored"}}
            ]}"#,
        )
        .await;

    let generator = fixture.generator();
    let text = generator
        .generate(
            &[Message::user("Suggest a title")],
            GenerationOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(text, "The Salt Road");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generate_without_choices_is_empty() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_json_response(r#"{"choices":[]}"#).await;

    let text = fixture
        .generator()
        .generate(&[Message::user("hi")], GenerationOptions::new())
        .await
        .unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn test_request_carries_shaped_options() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gemini-2.5-pro-exp-03-25",
                "max_tokens": 256,
                "stream": false,
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .match_header("x-request-id", mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create_async()
            .await
    };

    let text = fixture
        .generator()
        .generate(
            &[Message::system("Be brief."), Message::user("hi")],
            GenerationOptions::new()
                .model("gemini-2.5-pro-exp-03-25")
                .max_tokens(256),
        )
        .await
        .unwrap();
    assert_eq!(text, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_messages_make_no_request() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_unreachable().await;

    // No credential configured: an empty call must not even look.
    let generator = fixture.generator_with(Arc::new(MemoryCredentials::new()));
    let text = generator
        .generate(&[], GenerationOptions::new())
        .await
        .unwrap();
    assert_eq!(text, "");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_credential_makes_no_request() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_unreachable().await;

    let generator = fixture.generator_with(Arc::new(MemoryCredentials::new()));
    let err = generator
        .generate(&[Message::user("hi")], GenerationOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::MissingCredential);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rotated_key_is_used_on_next_call() {
    let fixture = MockServerFixture::new().await;
    let creds = Arc::new(MemoryCredentials::with_credential("sk-old"));
    let generator = fixture.generator_with(creds.clone());

    let new_key_mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-new")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"fresh"}}]}"#)
            .expect(1)
            .create_async()
            .await
    };

    generator.update_credential("sk-new").unwrap();
    let text = generator
        .generate(&[Message::user("hi")], GenerationOptions::new())
        .await
        .unwrap();
    assert_eq!(text, "fresh");
    new_key_mock.assert_async().await;
}
