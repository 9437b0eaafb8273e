use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::MediaResolver;
use super::wire::{lenient_opt_string, lenient_string, lenient_string_list, parse_timestamp};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Post,
    Event,
    Yearbook,
    Other,
}

impl NotificationKind {
    /// Parse the server's `type` field. Unknown values map to `Other`.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "post" => NotificationKind::Post,
            "event" => NotificationKind::Event,
            "yearbook" => NotificationKind::Yearbook,
            _ => NotificationKind::Other,
        }
    }

    /// Wire name, as used in the `type` field and in API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Post => "post",
            NotificationKind::Event => "event",
            NotificationKind::Yearbook => "yearbook",
            NotificationKind::Other => "other",
        }
    }

    /// Whether selecting the notification loads a related post/event.
    pub fn has_related_content(&self) -> bool {
        matches!(self, NotificationKind::Post | NotificationKind::Event)
    }
}

/// Notification format from the server (different from client Notification).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerNotification {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub related_id: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub post_images: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub event_images: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub post_content: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub yearbook_image: Option<String>,
}

impl ServerNotification {
    /// Convert to the client-side Notification.
    pub fn to_client_notification(self) -> Notification {
        let actor_initial = self
            .first_name
            .chars()
            .next()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());

        let mut media_refs = self.post_images;
        media_refs.extend(self.event_images);

        Notification {
            id: self.id,
            kind: NotificationKind::from_wire(&self.kind),
            actor_name: self.first_name,
            actor_initial,
            message: self.message,
            created_at: parse_timestamp(&self.created_at),
            related_id: self.related_id,
            media_refs,
            profile_image: self.profile,
            content: self.post_content,
            cover_image: self.yearbook_image,
        }
    }
}

/// A single entry in the notification feed.
///
/// Read/unread is not stored here; it is projected from the read state.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub actor_name: String,
    /// First character of `actor_name`, or `?`.
    pub actor_initial: String,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
    pub related_id: String,
    /// Post images followed by event images, unresolved.
    pub media_refs: Vec<String>,
    pub profile_image: Option<String>,
    /// Body text of the related post, when the server embeds it.
    pub content: Option<String>,
    /// Cover image for yearbook notifications.
    pub cover_image: Option<String>,
}

impl Notification {
    /// Build a notification for the user's own action.
    pub fn new(
        kind: NotificationKind,
        actor_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ServerNotification {
            kind: kind.as_str().to_string(),
            first_name: actor_name.into(),
            message: message.into(),
            ..Default::default()
        }
        .to_client_notification()
        .with_created_at(Utc::now())
    }

    pub fn with_related_id(mut self, related_id: impl Into<String>) -> Self {
        self.related_id = related_id.into();
        self
    }

    pub fn with_media(mut self, refs: Vec<String>) -> Self {
        self.media_refs = refs;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Media references resolved for display, blank entries dropped.
    pub fn resolved_media(&self, resolver: &MediaResolver) -> Vec<String> {
        resolver.resolve_all(&self.media_refs)
    }

    /// Convert back to the server shape (used by the injection channel).
    pub fn to_server(&self) -> ServerNotification {
        let (post_images, event_images) = match self.kind {
            NotificationKind::Event => (Vec::new(), self.media_refs.clone()),
            _ => (self.media_refs.clone(), Vec::new()),
        };

        ServerNotification {
            id: self.id.clone(),
            kind: self.kind.as_str().to_string(),
            first_name: self.actor_name.clone(),
            message: self.message.clone(),
            created_at: self.created_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            related_id: self.related_id.clone(),
            post_images,
            event_images,
            profile: self.profile_image.clone(),
            post_content: self.content.clone(),
            yearbook_image: self.cover_image.clone(),
        }
    }
}

/// Decode a notification list response.
///
/// A top-level value that is not an array is a malformed response; entries
/// that are not objects are skipped.
pub fn parse_notification_list(
    value: serde_json::Value,
) -> Result<Vec<Notification>, serde_json::Error> {
    let items: Vec<serde_json::Value> = serde_json::from_value(value)?;
    Ok(items
        .into_iter()
        .filter(|item| item.is_object())
        .filter_map(|item| serde_json::from_value::<ServerNotification>(item).ok())
        .map(ServerNotification::to_client_notification)
        .collect())
}
