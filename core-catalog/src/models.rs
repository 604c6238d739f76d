//! Catalogue records as served by the backend.
//!
//! Field names follow the database columns (`snake_case`), so rows
//! deserialize directly from the REST responses.

use chrono::{DateTime, Utc};
use core_playback::PlayableItem;
use serde::{Deserialize, Serialize};

/// Shown as the "preacher" line for live streams.
pub const LIVE_STREAM_LABEL: &str = "En direct";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Sermon as listed on cards and carousels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SermonSummary {
    pub id: String,
    pub title: String,
    pub preacher: String,
    pub audio_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SermonSummary {
    pub fn to_playable(&self) -> PlayableItem {
        playable(&self.id, &self.title, &self.preacher, &self.audio_url, self.image_url.as_deref())
    }
}

/// Sermon as shown on the detail screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SermonDetail {
    pub id: String,
    pub title: String,
    pub preacher: String,
    #[serde(default)]
    pub description: Option<String>,
    pub audio_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Length in seconds, when known.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub category_id: Option<String>,
}

impl SermonDetail {
    pub fn to_playable(&self) -> PlayableItem {
        playable(&self.id, &self.title, &self.preacher, &self.audio_url, self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioStream {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stream_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl RadioStream {
    pub fn to_playable(&self) -> PlayableItem {
        playable(
            &self.id,
            &self.title,
            LIVE_STREAM_LABEL,
            &self.stream_url,
            self.image_url.as_deref(),
        )
    }
}

/// Everything the home screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeFeed {
    pub categories: Vec<Category>,
    pub featured: Vec<SermonSummary>,
    pub recent: Vec<SermonSummary>,
}

fn playable(
    id: &str,
    title: &str,
    preacher: &str,
    audio_url: &str,
    image_url: Option<&str>,
) -> PlayableItem {
    let item = PlayableItem::new(id, title, preacher, audio_url);
    match image_url {
        Some(url) => item.with_image_url(url),
        None => item,
    }
}
