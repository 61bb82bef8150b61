//! # quillstream
//!
//! Streaming text generation for writing tools: one call from a message list to paced,
//! character-by-character output, with every failure mapped to a small set of user-facing
//! categories.
//!
//! ## Overview
//!
//! A [`Generator`] talks to an OpenAI-compatible chat completions endpoint (Gemini by
//! default). It looks up the API key on every call and keeps one provider client per key, so
//! rotating the key in settings needs no restart. Streamed increments are decoded from SSE,
//! handed to the caller in order, and can be smoothed for display by a [`PacingQueue`].
//!
//! ## Key Features
//!
//! - **Credential-keyed client cache**: [`client::ClientCache`] rebuilds only when the key changes
//! - **Streaming-first**: cooperative cancellation at every await point
//! - **Error classification**: [`classify`] maps any failure to an [`ErrorCategory`]
//! - **Display pacing**: one character per frame via [`pacing`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quillstream::{GenerationOptions, Generator, Message};
//!
//! #[tokio::main]
//! async fn main() -> quillstream::Result<()> {
//!     let generator = Generator::builder().build()?;
//!     let messages = vec![Message::user("Suggest a title for a story about salt.")];
//!
//!     let result = generator
//!         .generate_stream(&messages, GenerationOptions::new(), |text| print!("{text}"))
//!         .await;
//!     if let Err(e) = result {
//!         eprintln!("[{}] {}", e.category.code(), e.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Generator, builder, client cache, request shaping, classification |
//! | [`transport`] | HTTP client bound to one credential |
//! | [`pipeline`] | SSE decoding and delta selection |
//! | [`pacing`] | Frame-paced character emission |
//! | [`session`] | A streaming call wired into a pacing queue |
//! | [`credentials`] | Credential sources (memory, OS keyring) |
//! | [`config`] | Configuration from defaults, YAML and environment |
//! | [`models`] | Known model ids |
//! | [`types`] | Messages and fragments |

pub mod client;
pub mod config;
pub mod credentials;
pub mod error_code;
pub mod models;
pub mod pacing;
pub mod pipeline;
pub mod session;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{classify, GenerationOptions, Generator, GeneratorBuilder};
pub use config::GeneratorConfig;
pub use credentials::{CredentialSource, KeyringCredentials, MemoryCredentials};
pub use error_code::ErrorCategory;
pub use pacing::{FrameScheduler, IntervalFrames, PacingQueue};
pub use session::PacedSession;
pub use types::{Fragment, Message, MessageRole};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result for pipeline operations
pub type PipeResult<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `PipeResult<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = PipeResult<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{ClassifiedError, Error, ErrorContext};
