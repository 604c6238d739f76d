//! Session data model.

use crate::error::PlaybackError;
use serde::{Deserialize, Serialize};

/// Any audio content (sermon or radio stream) that can be loaded into a
/// playback slot. Never mutated once handed to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayableItem {
    pub id: String,
    pub title: String,
    /// Preacher for sermons, station name for radio.
    pub preacher: String,
    pub image_url: Option<String>,
    pub audio_url: String,
}

impl PlayableItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        preacher: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            preacher: preacher.into(),
            image_url: None,
            audio_url: audio_url.into(),
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Playback lifecycle state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransportState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Error,
}

/// Read contract shared by every consumer surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub current_item: Option<PlayableItem>,
    pub transport_state: TransportState,
    pub position_ms: u64,
    /// `0` until the engine reports a duration.
    pub duration_ms: u64,
    pub is_minimized: bool,
    pub is_buffering: bool,
    pub volume: f32,
    pub is_muted: bool,
    /// Set when `transport_state` is `Error`, cleared by the next `play_item`.
    pub last_error: Option<PlaybackError>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            current_item: None,
            transport_state: TransportState::Idle,
            position_ms: 0,
            duration_ms: 0,
            is_minimized: false,
            is_buffering: false,
            volume: 1.0,
            is_muted: false,
            last_error: None,
        }
    }
}

impl SessionSnapshot {
    pub fn current_item_id(&self) -> Option<&str> {
        self.current_item.as_ref().map(|item| item.id.as_str())
    }

    /// `true` when `item_id` is the loaded item, whatever its transport state.
    pub fn is_current(&self, item_id: &str) -> bool {
        self.current_item_id() == Some(item_id)
    }

    /// The "currently playing" indicator for a surface showing `item_id`.
    pub fn is_playing_item(&self, item_id: &str) -> bool {
        self.is_current(item_id) && self.transport_state == TransportState::Playing
    }

    /// Position over duration in `0.0..=1.0`; `0.0` while the duration is unknown.
    pub fn progress_fraction(&self) -> f32 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0) as f32
    }
}
