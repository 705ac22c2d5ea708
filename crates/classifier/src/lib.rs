//! Classifier implementations backed by an OpenAI-compatible API.

pub mod cache;
pub mod client;

pub use cache::CachedClassifier;
pub use client::HttpClassifier;
