//! Streaming response pipeline.
//!
//! ```text
//! Raw Bytes → SseDecoder → select_fragments → Fragment stream
//!     │            │               │
//!   HTTP       SSE framing     choices[0].delta.content,
//!                              in-band error frames
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | SSE decoder (bytes to JSON frames) |
//! | [`select`] | Delta selection (frames to text fragments) |

pub mod decode;
pub mod select;

use crate::types::Fragment;
use crate::BoxStream;
use bytes::Bytes;

pub use decode::SseDecoder;
pub use select::{delta_text, select_fragments};

/// Ordered fragments of one streaming response. Dropping it releases the connection.
pub type FragmentStream = BoxStream<'static, Fragment>;

/// Build the fragment stream for a raw SSE response body.
pub fn fragment_stream(body: BoxStream<'static, Bytes>) -> FragmentStream {
    select_fragments(SseDecoder::new().decode_stream(body))
}
