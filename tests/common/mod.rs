//! Common fixtures for integration tests.
//!
//! # Example
//!
//! ```ignore
//! mod common;
//! use common::{test_engine, notification_json};
//!
//! let mock = MockHttpClient::new();
//! let (mut engine, store) = test_engine(&mock);
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use alumni_sync::adapters::mock::{InMemoryStore, MockHttpClient, MockResponse};
use alumni_sync::app::Engine;
use alumni_sync::config::SyncConfig;
use serde_json::{json, Value};

pub const API_URL: &str = "http://chat.test";
pub const FEED_URL: &str = "http://feed.test";
pub const MEDIA_URL: &str = "http://media.test";
pub const SELF_ID: &str = "me";

pub fn notifications_url() -> String {
    format!("{}/api/notifications", FEED_URL)
}

pub fn history_url(peer_id: &str) -> String {
    format!("{}/api/messages/{}/{}", API_URL, SELF_ID, peer_id)
}

pub fn send_url() -> String {
    format!("{}/api/messages", API_URL)
}

pub fn delete_url(message_id: &str) -> String {
    format!("{}/api/messages/{}", API_URL, message_id)
}

pub fn yearbook_url(yearbook_id: &str) -> String {
    format!("{}/yearbook/{}/images", FEED_URL, yearbook_id)
}

pub fn test_config() -> SyncConfig {
    SyncConfig::new()
        .with_api_url(API_URL)
        .with_feed_url(FEED_URL)
        .with_media_url(MEDIA_URL)
        .with_user_id(SELF_ID)
}

/// Engine over `mock` and a fresh in-memory store.
pub fn test_engine(mock: &MockHttpClient) -> (Engine, InMemoryStore) {
    let store = InMemoryStore::new();
    let engine = engine_with_store(mock, &store);
    (engine, store)
}

/// Engine over `mock` sharing `store` with other engines.
pub fn engine_with_store(mock: &MockHttpClient, store: &InMemoryStore) -> Engine {
    Engine::new(
        &test_config(),
        Arc::new(mock.clone()),
        Arc::new(store.clone()),
    )
}

/// Server JSON for one notification.
pub fn notification_json(id: u64, kind: &str, first_name: &str) -> Value {
    json!({
        "id": id,
        "type": kind,
        "first_name": first_name,
        "message": format!("{} notification {}", kind, id),
        "created_at": "2024-05-01T10:00:00Z",
        "related_id": id * 10,
        "post_images": ["post.jpg"],
        "event_images": null
    })
}

/// Server JSON for one chat message.
pub fn chat_message_json(id: u64, sender_id: &str, text: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "sender_id": sender_id,
        "receiver_id": if sender_id == SELF_ID { "peer" } else { SELF_ID },
        "message": text,
        "created_at": created_at
    })
}

pub fn set_feed(mock: &MockHttpClient, items: Vec<Value>) {
    mock.set_response(&notifications_url(), MockResponse::json(Value::Array(items)));
}

pub fn set_history(mock: &MockHttpClient, peer_id: &str, items: Vec<Value>) {
    mock.set_response(&history_url(peer_id), MockResponse::json(Value::Array(items)));
}
