//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses and latency
//! - [`InMemoryStore`] - in-memory key/value storage

pub mod http;
pub mod kv_store;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use kv_store::InMemoryStore;
