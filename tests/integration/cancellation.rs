//! Integration tests for cooperative cancellation

use crate::integration::mock_server::{delta, MockServerFixture, COMPLETIONS_PATH};
use quillstream::{ErrorCategory, GenerationOptions, Message};
use std::io::Write;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_cancel_after_two_fragments() {
    let fixture = MockServerFixture::new().await;
    let frames: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|t| delta(t)).collect();
    let chunks: Vec<&str> = frames.iter().map(String::as_str).collect();
    let _mock = fixture.mock_sse_stream(&chunks).await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    let mut seen = Vec::new();
    let err = fixture
        .generator()
        .generate_stream(
            &[Message::user("hi")],
            GenerationOptions::new().cancellation(token),
            |text| {
                seen.push(text.to_string());
                if seen.len() == 2 {
                    trigger.cancel();
                }
            },
        )
        .await
        .unwrap_err();

    assert_eq!(seen, vec!["a", "b"]);
    assert_eq!(err.category, ErrorCategory::Aborted);
    assert!(err.category.is_silent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_while_stream_stalls() {
    let fixture = MockServerFixture::new().await;
    let _mock = mock_stalled_stream(&fixture).await;

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let mut seen = Vec::new();
    let err = fixture
        .generator()
        .generate_stream(
            &[Message::user("hi")],
            GenerationOptions::new().cancellation(token),
            |text| seen.push(text.to_string()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::Aborted);
    assert!(seen.len() <= 1);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_abort_discards_paced_remainder() {
    use quillstream::pacing::{IntervalFrames, PacingQueue};
    use quillstream::PacedSession;
    use std::sync::{Arc, Mutex};

    let fixture = MockServerFixture::new().await;
    let frames: Vec<String> = ["one ", "two ", "three ", "four ", "five"]
        .iter()
        .map(|t| delta(t))
        .collect();
    let chunks: Vec<&str> = frames.iter().map(String::as_str).collect();
    let _mock = fixture.mock_sse_stream(&chunks).await;

    let out = Arc::new(Mutex::new(String::new()));
    let sink_out = out.clone();
    // Slow frames: nothing is rendered before the abort lands.
    let session = PacedSession::new(PacingQueue::new(
        move |c| sink_out.lock().unwrap().push(c),
        Arc::new(IntervalFrames::new(Duration::from_millis(200))),
    ));
    let token = session.cancellation();
    let generator = fixture.generator();
    let messages = [Message::user("count")];

    let err = session
        .run(|queue| {
            let mut delivered = 0;
            generator.generate_stream(
                &messages,
                GenerationOptions::new().cancellation(token.clone()),
                move |text| {
                    queue.push(text);
                    delivered += 1;
                    if delivered == 2 {
                        token.cancel();
                    }
                },
            )
        })
        .await
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::Aborted);
    assert!(session.queue().is_closed());
    assert_eq!(session.queue().pending(), 0);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(out.lock().unwrap().is_empty());
}

async fn mock_stalled_stream(fixture: &MockServerFixture) -> mockito::Mock {
    let first = format!("data: {}\n\n", delta("first"));
    let mut server = fixture.server.lock().await;
    server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(move |w| {
            w.write_all(first.as_bytes())?;
            w.flush()?;
            std::thread::sleep(Duration::from_secs(3));
            w.write_all(b"data: [DONE]\n\n")
        })
        .create_async()
        .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_session_cancel_overrides_caller_token() {
    use quillstream::pacing::{ImmediateFrames, PacingQueue};
    use quillstream::PacedSession;
    use std::sync::Arc;

    let fixture = MockServerFixture::new().await;
    let _mock = mock_stalled_stream(&fixture).await;

    let session = Arc::new(PacedSession::new(PacingQueue::new(
        |_| {},
        Arc::new(ImmediateFrames),
    )));
    let canceller = session.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        canceller.cancel();
    });

    let caller = CancellationToken::new();
    let started = Instant::now();
    let err = session
        .generate(
            &fixture.generator(),
            &[Message::user("hi")],
            GenerationOptions::new().cancellation(caller.clone()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::Aborted);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(session.queue().is_closed());
    assert!(!caller.is_cancelled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_caller_token_cancels_session() {
    use quillstream::pacing::{ImmediateFrames, PacingQueue};
    use quillstream::PacedSession;
    use std::sync::Arc;

    let fixture = MockServerFixture::new().await;
    let _mock = mock_stalled_stream(&fixture).await;

    let session = PacedSession::new(PacingQueue::new(|_| {}, Arc::new(ImmediateFrames)));
    let caller = CancellationToken::new();
    let trigger = caller.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = session
        .generate(
            &fixture.generator(),
            &[Message::user("hi")],
            GenerationOptions::new().cancellation(caller),
        )
        .await
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::Aborted);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(session.cancellation().is_cancelled());
    assert!(session.queue().is_closed());
}
