//! Mock provider setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use quillstream::{CredentialSource, Generator, MemoryCredentials};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const TEST_KEY: &str = "sk-test";
pub const COMPLETIONS_PATH: &str = "/chat/completions";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Generator pointed at the mock server, holding [`TEST_KEY`].
    pub fn generator(&self) -> Generator {
        self.generator_with(Arc::new(MemoryCredentials::with_credential(TEST_KEY)))
    }

    /// Generator pointed at the mock server with a caller-supplied credential source.
    pub fn generator_with(&self, credentials: Arc<dyn CredentialSource>) -> Generator {
        Generator::builder()
            .env_overrides(false)
            .credentials(credentials)
            .base_url_override(&self.base_url)
            .timeout_secs(5)
            .build()
            .expect("mock generator config is valid")
    }

    /// Successful streaming response (SSE). Bare payloads get a `data: ` prefix.
    pub async fn mock_sse_stream(&self, chunks: &[&str]) -> Mock {
        let body = chunks
            .iter()
            .map(|chunk| {
                if chunk.starts_with("data: ") {
                    format!("{}\n\n", chunk)
                } else {
                    format!("data: {}\n\n", chunk)
                }
            })
            .collect::<Vec<_>>()
            .join("");

        let mut server = self.server.lock().await;
        server
            .mock("POST", COMPLETIONS_PATH)
            .match_header("authorization", format!("Bearer {}", TEST_KEY).as_str())
            .match_body(Matcher::PartialJson(serde_json::json!({"stream": true})))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await
    }

    /// Successful non-streaming JSON response.
    pub async fn mock_json_response(&self, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", COMPLETIONS_PATH)
            .match_header("authorization", format!("Bearer {}", TEST_KEY).as_str())
            .match_body(Matcher::PartialJson(serde_json::json!({"stream": false})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Error response with the given status, for any request.
    pub async fn mock_error_response(&self, status: usize, error_body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", COMPLETIONS_PATH)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(error_body)
            .create_async()
            .await
    }

    /// A mock that must never be hit.
    pub async fn mock_unreachable(&self) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", COMPLETIONS_PATH)
            .expect(0)
            .create_async()
            .await
    }
}

/// One OpenAI-style streaming increment carrying `text`.
pub fn delta(text: &str) -> String {
    serde_json::json!({"choices": [{"index": 0, "delta": {"content": text}}]}).to_string()
}
