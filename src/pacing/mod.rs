//! Display pacing.
//!
//! Providers deliver text in bursts. [`PacingQueue`] buffers it and hands the UI exactly one
//! character per frame from a [`FrameScheduler`], so text appears at a steady typing rate
//! regardless of network jitter.
//!
//! ```rust,no_run
//! use quillstream::pacing::{IntervalFrames, PacingQueue};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let queue = PacingQueue::new(|c| print!("{c}"), Arc::new(IntervalFrames::default()));
//! queue.push("Hello, ");
//! queue.push("world");
//! queue.finished().await;
//! # }
//! ```

pub mod frames;
pub mod queue;

pub use frames::{FrameScheduler, ImmediateFrames, IntervalFrames};
pub use queue::{CharSink, PacingQueue};
