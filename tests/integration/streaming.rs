//! Integration tests for streaming responses

use crate::integration::mock_server::{delta, MockServerFixture};
use quillstream::pacing::{ImmediateFrames, PacingQueue};
use quillstream::{ErrorCategory, GenerationOptions, Message, PacedSession};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_sse_streaming_response() {
    let fixture = MockServerFixture::new().await;
    let role_only = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
    let _mock = fixture
        .mock_sse_stream(&[
            role_only,
            delta("Hel").as_str(),
            delta("lo, ").as_str(),
            delta("").as_str(),
            delta("world").as_str(),
            "[DONE]",
        ])
        .await;

    let mut fragments = Vec::new();
    fixture
        .generator()
        .generate_stream(
            &[Message::user("Say hello")],
            GenerationOptions::new(),
            |text| fragments.push(text.to_string()),
        )
        .await
        .unwrap();

    assert_eq!(fragments, vec!["Hel", "lo, ", "world"]);
}

#[tokio::test]
async fn test_error_frame_fails_stream() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_sse_stream(&[
            delta("partial").as_str(),
            r#"{"error":{"code":"rate_limit_exceeded","message":"quota exhausted"}}"#,
            delta("never delivered").as_str(),
        ])
        .await;

    let mut fragments = Vec::new();
    let err = fixture
        .generator()
        .generate_stream(
            &[Message::user("hi")],
            GenerationOptions::new(),
            |text| fragments.push(text.to_string()),
        )
        .await
        .unwrap_err();

    assert_eq!(fragments, vec!["partial"]);
    assert_eq!(err.category, ErrorCategory::RateLimited);
}

#[tokio::test]
async fn test_paced_session_renders_every_char() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_sse_stream(&[delta("Hé").as_str(), delta("llo, 世界").as_str(), "[DONE]"])
        .await;

    let out = Arc::new(Mutex::new(String::new()));
    let sink_out = out.clone();
    let session = PacedSession::new(PacingQueue::new(
        move |c| sink_out.lock().unwrap().push(c),
        Arc::new(ImmediateFrames),
    ));

    session
        .generate(
            &fixture.generator(),
            &[Message::user("hi")],
            GenerationOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(out.lock().unwrap().as_str(), "Héllo, 世界");
    assert_eq!(session.queue().pending(), 0);
}
