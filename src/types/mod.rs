//! Core data types shared by the generation pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and plain-text content |
//! | [`MessageRole`] | Message role (system, user, assistant) |
//! | [`Fragment`] | One non-empty text delta delivered by a streaming response |
//!
//! ## Example
//!
//! ```rust
//! use quillstream::types::{Message, MessageRole};
//!
//! let history = vec![
//!     Message::system("You are a careful fiction editor."),
//!     Message::user("Tighten this paragraph."),
//! ];
//! assert_eq!(history[0].role, MessageRole::System);
//! ```

pub mod events;
pub mod message;

pub use events::Fragment;
pub use message::{Message, MessageRole};
