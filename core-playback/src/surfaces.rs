//! Consumer surface projections.
//!
//! Cards, carousel entries, the detail screen and the mini-player read the
//! session only through these views, and write to it only through the store
//! actions (plus the two helpers at the bottom of this module).

use crate::outcome::ActionOutcome;
use crate::store::SessionStore;
use crate::types::{PlayableItem, SessionSnapshot, TransportState};

/// Placeholder shown while a duration is unknown.
pub const UNKNOWN_DURATION: &str = "--:--";

/// List card / carousel entry for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub item_id: String,
    pub title: String,
    pub preacher: String,
    pub image_url: Option<String>,
    pub is_current: bool,
    /// Drives the pause icon and the "now playing" highlight.
    pub is_playing: bool,
    pub is_loading: bool,
    pub has_error: bool,
}

impl CardView {
    pub fn project(item: &PlayableItem, snapshot: &SessionSnapshot) -> Self {
        let is_current = snapshot.is_current(&item.id);
        let state = snapshot.transport_state;
        Self {
            item_id: item.id.clone(),
            title: item.title.clone(),
            preacher: item.preacher.clone(),
            image_url: item.image_url.clone(),
            is_current,
            is_playing: is_current && state == TransportState::Playing,
            is_loading: is_current && state == TransportState::Loading,
            has_error: is_current && state == TransportState::Error,
        }
    }
}

/// Sermon detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub card: CardView,
    pub description: Option<String>,
    /// Catalogue duration as `m:ss`, or [`UNKNOWN_DURATION`].
    pub duration_label: String,
}

impl DetailView {
    pub fn project(
        item: &PlayableItem,
        description: Option<&str>,
        duration_secs: Option<u64>,
        snapshot: &SessionSnapshot,
    ) -> Self {
        Self {
            card: CardView::project(item, snapshot),
            description: description.map(str::to_string),
            duration_label: format_duration_secs(duration_secs),
        }
    }
}

/// Persistent mini-player. `None` when nothing is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniPlayerView {
    pub title: String,
    pub preacher: String,
    pub image_url: Option<String>,
    pub transport_state: TransportState,
    pub is_playing: bool,
    pub is_loading: bool,
    pub is_buffering: bool,
    pub has_error: bool,
    pub error_message: Option<String>,
    pub is_minimized: bool,
    /// Artwork is only shown in the expanded layout.
    pub show_artwork: bool,
    pub position_label: String,
    pub duration_label: String,
    /// `0.0..=100.0`
    pub progress_percent: f32,
}

impl MiniPlayerView {
    pub fn project(snapshot: &SessionSnapshot) -> Option<Self> {
        let item = snapshot.current_item.as_ref()?;
        let state = snapshot.transport_state;

        Some(Self {
            title: item.title.clone(),
            preacher: item.preacher.clone(),
            image_url: item.image_url.clone(),
            transport_state: state,
            is_playing: state == TransportState::Playing,
            is_loading: state == TransportState::Loading,
            is_buffering: snapshot.is_buffering,
            has_error: state == TransportState::Error,
            error_message: snapshot.last_error.as_ref().map(ToString::to_string),
            is_minimized: snapshot.is_minimized,
            show_artwork: !snapshot.is_minimized && item.image_url.is_some(),
            position_label: format_clock_ms(snapshot.position_ms),
            duration_label: format_clock_ms(snapshot.duration_ms),
            progress_percent: snapshot.progress_fraction() * 100.0,
        })
    }
}

/// `m:ss` for a millisecond position.
pub fn format_clock_ms(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// `m:ss` for a catalogue duration, [`UNKNOWN_DURATION`] when absent or zero.
pub fn format_duration_secs(secs: Option<u64>) -> String {
    match secs {
        Some(secs) if secs > 0 => format!("{}:{:02}", secs / 60, secs % 60),
        _ => UNKNOWN_DURATION.to_string(),
    }
}

/// Play button shared by cards, carousel entries and the detail screen.
///
/// Toggles when `item` is already current, retries when it is current but
/// failed, and otherwise replaces the session with `item`.
pub async fn press_play(store: &SessionStore, item: &PlayableItem) -> ActionOutcome {
    let snapshot = store.snapshot();
    if !snapshot.is_current(&item.id) {
        return store.play_item(item.clone()).await;
    }
    match snapshot.transport_state {
        TransportState::Error => store.retry().await,
        TransportState::Loading => ActionOutcome::NoOp,
        _ => store.toggle_play_pause().await,
    }
}

/// Progress bar tap at `fraction` of the width.
pub async fn seek_to_fraction(store: &SessionStore, fraction: f32) -> ActionOutcome {
    let duration_ms = store.snapshot().duration_ms;
    if duration_ms == 0 {
        return ActionOutcome::NoOp;
    }
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let position_ms = (duration_ms as f64 * fraction as f64).round() as u64;
    store.seek_to(position_ms).await
}
