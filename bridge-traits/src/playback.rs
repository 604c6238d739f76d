//! Playback engine bridge.
//!
//! The core never decodes audio. It drives a host-provided [`PlaybackEngine`]
//! (AVPlayer, ExoPlayer, a desktop decoder...) through opaque
//! [`EngineHandle`]s and listens to the engine's status channel.
//!
//! ## Contract
//!
//! - `load` begins fetching/buffering a URI and, on success, yields a live
//!   handle plus the receiving end of that handle's status channel.
//! - `play`, `pause`, `stop`, `seek`, `set_volume` and `set_muted` fail with
//!   [`BridgeError::StaleHandle`](crate::error::BridgeError::StaleHandle) when
//!   the handle has already been unloaded.
//! - `seek` forwards positions uncorrected; clamping is the engine's business.
//! - `unload` is idempotent: unloading an already-unloaded handle is `Ok(())`.
//! - Status delivery for one handle is FIFO. Engines may still emit a stray
//!   status after `unload`; consumers must tolerate and ignore it.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque reference to a live, loaded audio resource inside an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle(Uuid);

impl EngineHandle {
    /// Generate a new handle identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct a handle from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Request describing what the engine should load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    /// Source URI (HTTP(S) stream or file URI).
    pub uri: String,
    /// Start playing as soon as enough data is buffered.
    pub autoplay: bool,
}

impl LoadRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            autoplay: false,
        }
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
}

/// Snapshot of a loaded resource as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackStatus {
    pub is_loaded: bool,
    pub is_buffering: bool,
    pub is_playing: bool,
    pub position_ms: u64,
    /// `0` until the engine knows the duration (live streams may never report one).
    pub duration_ms: u64,
    pub is_muted: bool,
    /// Normalized gain in `0.0..=1.0`.
    pub volume: f32,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self {
            is_loaded: false,
            is_buffering: false,
            is_playing: false,
            position_ms: 0,
            duration_ms: 0,
            is_muted: false,
            volume: 1.0,
        }
    }
}

impl PlaybackStatus {
    /// A loaded status that is actively playing.
    pub fn playing(position_ms: u64, duration_ms: u64) -> Self {
        Self {
            is_loaded: true,
            is_playing: true,
            position_ms,
            duration_ms,
            ..Self::default()
        }
    }

    /// A loaded status that is paused.
    pub fn paused(position_ms: u64, duration_ms: u64) -> Self {
        Self {
            is_loaded: true,
            is_playing: false,
            position_ms,
            duration_ms,
            ..Self::default()
        }
    }

    pub fn with_buffering(mut self, buffering: bool) -> Self {
        self.is_buffering = buffering;
        self
    }
}

/// One message on a handle's status channel.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineStatus {
    /// Periodic or transition-driven status report.
    Update(PlaybackStatus),
    /// The engine gave up on the resource (network drop, decoder failure).
    Failed { message: String },
}

pub type StatusSender = mpsc::UnboundedSender<EngineStatus>;
pub type StatusReceiver = mpsc::UnboundedReceiver<EngineStatus>;

/// Create a status channel. Engines keep the sender, [`LoadedSound`] carries
/// the receiver.
pub fn status_channel() -> (StatusSender, StatusReceiver) {
    mpsc::unbounded_channel()
}

/// Result of a successful `load`.
#[derive(Debug)]
pub struct LoadedSound {
    pub handle: EngineHandle,
    pub status: StatusReceiver,
}

impl LoadedSound {
    pub fn new(handle: EngineHandle, status: StatusReceiver) -> Self {
        Self { handle, status }
    }
}

/// Process-wide audio session behaviour requested from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMode {
    /// Keep playing when the iOS ring/silent switch is on.
    #[serde(default = "default_true")]
    pub plays_in_silent_mode_ios: bool,
    /// Keep the audio session alive while the app is backgrounded.
    #[serde(default = "default_true")]
    pub stays_active_in_background: bool,
    /// Lower other apps' audio instead of pausing it (Android).
    #[serde(default = "default_true")]
    pub should_duck_android: bool,
    /// Route audio through the earpiece rather than the speaker (Android).
    #[serde(default)]
    pub play_through_earpiece_android: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AudioMode {
    fn default() -> Self {
        Self {
            plays_in_silent_mode_ios: true,
            stays_active_in_background: true,
            should_duck_android: true,
            play_through_earpiece_android: false,
        }
    }
}

/// Host audio engine.
///
/// A single engine instance may back several resources over its lifetime;
/// the core guarantees it keeps at most one resource alive per playback slot.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Apply process-wide audio session settings. Engines without such a
    /// concept can keep the default no-op.
    async fn configure_audio_mode(&self, mode: AudioMode) -> Result<()> {
        let _ = mode;
        Ok(())
    }

    /// Begin fetching/buffering `request.uri`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::LoadFailed`](crate::error::BridgeError::LoadFailed) when
    /// the URI is unreachable or the format is unsupported.
    async fn load(&self, request: LoadRequest) -> Result<LoadedSound>;

    /// Start or resume playback.
    async fn play(&self, handle: EngineHandle) -> Result<()>;

    /// Pause without releasing the resource.
    async fn pause(&self, handle: EngineHandle) -> Result<()>;

    /// Stop playback and rewind. The resource stays loaded.
    async fn stop(&self, handle: EngineHandle) -> Result<()>;

    /// Move the playhead to an absolute position.
    async fn seek(&self, handle: EngineHandle, position_ms: u64) -> Result<()>;

    /// Set gain in `0.0..=1.0`.
    async fn set_volume(&self, handle: EngineHandle, volume: f32) -> Result<()>;

    async fn set_muted(&self, handle: EngineHandle, muted: bool) -> Result<()>;

    /// Release everything bound to the handle. Idempotent.
    async fn unload(&self, handle: EngineHandle) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_handles_are_unique() {
        let a = EngineHandle::new();
        let b = EngineHandle::new();
        assert_ne!(a, b);
        assert_eq!(a, EngineHandle::from_uuid(*a.as_uuid()));
        assert_eq!(a.to_string().len(), 32);
    }

    #[test]
    fn load_request_defaults_to_no_autoplay() {
        let request = LoadRequest::new("https://example.com/sermon1.mp3");
        assert!(!request.autoplay);
        assert!(request.with_autoplay(true).autoplay);
    }

    #[test]
    fn status_helpers() {
        let status = PlaybackStatus::playing(0, 30_000);
        assert!(status.is_loaded);
        assert!(status.is_playing);
        assert_eq!(status.duration_ms, 30_000);
        assert_eq!(status.volume, 1.0);

        let paused = PlaybackStatus::paused(1_000, 30_000).with_buffering(true);
        assert!(!paused.is_playing);
        assert!(paused.is_buffering);
    }

    #[test]
    fn audio_mode_defaults() {
        let mode = AudioMode::default();
        assert!(mode.plays_in_silent_mode_ios);
        assert!(mode.stays_active_in_background);
        assert!(mode.should_duck_android);
        assert!(!mode.play_through_earpiece_android);

        let parsed: AudioMode = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, mode);
    }

    #[tokio::test]
    async fn status_channel_is_fifo() {
        let (tx, mut rx) = status_channel();
        tx.send(EngineStatus::Update(PlaybackStatus::playing(0, 10)))
            .unwrap();
        tx.send(EngineStatus::Failed {
            message: "network".into(),
        })
        .unwrap();

        assert!(matches!(rx.recv().await, Some(EngineStatus::Update(_))));
        assert!(matches!(rx.recv().await, Some(EngineStatus::Failed { .. })));
    }
}
