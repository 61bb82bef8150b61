//! Generation client.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod cache;
pub mod core;
pub mod error_classification;
pub mod lifecycle;
pub mod request;

pub use builder::GeneratorBuilder;
pub use cache::ClientCache;
pub use core::Generator;
pub use error_classification::{categorize, classify};
pub use lifecycle::{StreamLifecycle, StreamState};
pub use request::{GenerationOptions, ProviderRequest};
