//! Content looked up when a notification is selected.

use serde::Deserialize;
use serde_json::Value;

use super::notification::NotificationKind;
use super::wire::{lenient_string, value_to_string};

/// The post or event a notification points at.
///
/// The servers return different shapes for posts and events, so the body is
/// kept as JSON and read through the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedContent {
    pub kind: NotificationKind,
    pub related_id: String,
    pub data: Value,
}

impl RelatedContent {
    pub fn new(kind: NotificationKind, related_id: impl Into<String>, data: Value) -> Self {
        Self {
            kind,
            related_id: related_id.into(),
            data,
        }
    }

    /// A scalar field as a string, if present and non-empty.
    pub fn field(&self, name: &str) -> Option<String> {
        self.data
            .get(name)
            .map(value_to_string)
            .filter(|s| !s.is_empty())
    }

    /// Headline: `title`, falling back to `content`.
    pub fn title(&self) -> Option<String> {
        self.field("title").or_else(|| self.field("content"))
    }

    /// Image references listed under `images`, `post_images` or `event_images`.
    pub fn images(&self) -> Vec<String> {
        ["images", "post_images", "event_images"]
            .iter()
            .filter_map(|key| self.data.get(*key))
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    }
}

/// One page of a yearbook.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct YearbookImage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_path: String,
}

/// Decode a yearbook image list into page references, dropping blanks.
pub fn parse_yearbook_images(value: Value) -> Result<Vec<String>, serde_json::Error> {
    let items: Vec<Value> = serde_json::from_value(value)?;
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<YearbookImage>(item).ok())
        .map(|image| image.file_path.trim().to_string())
        .filter(|path| !path.is_empty())
        .collect())
}
