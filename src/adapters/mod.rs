//! Concrete implementations of trait abstractions.
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FileKeyValueStore`] - JSON-file key/value storage
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - configurable HTTP responses
//! - [`mock::InMemoryStore`] - in-memory key/value storage

pub mod file_store;
pub mod mock;
pub mod reqwest_http;

pub use file_store::FileKeyValueStore;
pub use mock::{InMemoryStore, MockHttpClient};
pub use reqwest_http::ReqwestHttpClient;
