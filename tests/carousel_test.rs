//! Integration tests for the image carousel driven through the engine.

mod common;

use std::time::Duration;

use alumni_sync::adapters::mock::{MockHttpClient, MockResponse};
use common::*;
use serde_json::json;

fn set_yearbook(mock: &MockHttpClient, yearbook_id: &str, paths: &[&str]) {
    let items: Vec<_> = paths.iter().map(|p| json!({"file_path": p})).collect();
    mock.set_response(&yearbook_url(yearbook_id), MockResponse::json(json!(items)));
}

#[tokio::test]
async fn test_yearbook_pages_open_at_first_image() {
    let mock = MockHttpClient::new();
    set_yearbook(
        &mock,
        "2019",
        &["pages/1.jpg", "", "https://cdn.test/2.jpg", "data:image/png;base64,AAAA"],
    );
    let (mut engine, _) = test_engine(&mock);

    engine.open_yearbook("2019");
    assert!(!engine.carousel.is_open());
    engine.run_until_idle().await;

    assert_eq!(engine.carousel.len(), 3);
    assert_eq!(engine.carousel.position(), Some((1, 3)));
    assert_eq!(
        engine.current_image().as_deref(),
        Some("http://media.test/pages/1.jpg")
    );

    engine.carousel.next();
    assert_eq!(engine.current_image().as_deref(), Some("https://cdn.test/2.jpg"));
    engine.carousel.next();
    assert_eq!(
        engine.current_image().as_deref(),
        Some("data:image/png;base64,AAAA")
    );
    engine.carousel.next();
    assert_eq!(engine.carousel.current_index(), Some(0));
    engine.carousel.prev();
    assert_eq!(engine.carousel.current_index(), Some(2));
}

#[tokio::test]
async fn test_empty_yearbook_stays_closed() {
    let mock = MockHttpClient::new();
    set_yearbook(&mock, "empty", &[]);
    let (mut engine, _) = test_engine(&mock);

    engine.open_yearbook("empty");
    engine.run_until_idle().await;

    assert!(!engine.carousel.is_open());
    assert!(engine.current_image().is_none());
}

#[tokio::test]
async fn test_broken_images_are_skipped_until_empty() {
    let mock = MockHttpClient::new();
    set_yearbook(&mock, "y", &["a.jpg", "b.jpg", "c.jpg"]);
    let (mut engine, _) = test_engine(&mock);

    engine.open_yearbook("y");
    engine.run_until_idle().await;
    engine.carousel.next();
    engine.carousel.next();
    assert_eq!(engine.carousel.current(), Some("c.jpg"));

    // Removing an earlier image keeps the same image on screen.
    engine.report_broken_image(0);
    assert_eq!(engine.carousel.current(), Some("c.jpg"));
    assert_eq!(engine.carousel.position(), Some((2, 2)));

    // Removing the current last image clamps to the new last one.
    engine.report_broken_image(1);
    assert_eq!(engine.carousel.current(), Some("b.jpg"));

    engine.report_broken_image(5);
    assert_eq!(engine.carousel.len(), 1);

    engine.report_broken_image(0);
    assert!(!engine.carousel.is_open());
    assert_eq!(engine.carousel.current_index(), None);
}

#[tokio::test]
async fn test_preview_supersedes_slow_yearbook() {
    let mock = MockHttpClient::new();
    set_yearbook(&mock, "slow", &["page.jpg"]);
    mock.set_delay(&yearbook_url("slow"), Duration::from_millis(50));
    let (mut engine, _) = test_engine(&mock);

    engine.open_yearbook("slow");
    assert!(engine.open_preview(&["one.jpg", "two.jpg"], 1));
    engine.run_until_idle().await;

    assert_eq!(engine.carousel.images(), ["one.jpg", "two.jpg"]);
    assert_eq!(engine.carousel.current(), Some("two.jpg"));
}

#[tokio::test]
async fn test_yearbook_failure_keeps_carousel_closed() {
    let mock = MockHttpClient::new();
    mock.set_response(&yearbook_url("y"), MockResponse::status(404, "not found"));
    let (mut engine, _) = test_engine(&mock);

    engine.open_yearbook("y");
    engine.run_until_idle().await;

    assert!(!engine.carousel.is_open());
    assert!(engine.last_error().is_some());
}

#[tokio::test]
async fn test_close_gallery_discards_pending_load() {
    let mock = MockHttpClient::new();
    set_yearbook(&mock, "y", &["a.jpg"]);
    let (mut engine, _) = test_engine(&mock);

    engine.open_yearbook("y");
    engine.close_gallery();
    engine.run_until_idle().await;

    assert!(!engine.carousel.is_open());
}

#[tokio::test]
async fn test_notification_media_previews_from_feed() {
    let mock = MockHttpClient::new();
    set_feed(
        &mock,
        vec![json!({
            "id": 1,
            "type": "post",
            "first_name": "Ana",
            "message": "shared photos",
            "post_images": ["x.jpg", "", "y.jpg"]
        })],
    );
    let (mut engine, _) = test_engine(&mock);

    engine.refresh_notifications();
    engine.run_until_idle().await;

    let refs = engine.notifications.get("1").unwrap().media_refs.clone();
    assert!(engine.open_preview(&refs, 2));
    assert_eq!(engine.carousel.position(), Some((2, 2)));
    assert_eq!(engine.current_image().as_deref(), Some("http://media.test/y.jpg"));
}
