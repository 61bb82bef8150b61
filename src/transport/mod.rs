//! HTTP transport to the text-generation provider.

pub mod http;

pub use http::ProviderClient;
