//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, DELETE)
//! - [`KeyValueStore`] - persisted local key/value storage

pub mod http;
pub mod kv_store;

pub use http::{Headers, HttpClient, HttpError, Response};
pub use kv_store::KeyValueStore;
