//! # Session Configuration
//!
//! Behaviour knobs for the session store and the radio slot.

use crate::error::{PlaybackError, Result};
use bridge_traits::AudioMode;
use serde::{Deserialize, Serialize};

/// How the live radio slot relates to the shared session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadioPolicy {
    /// Radio owns its own engine resource; a sermon and the radio can sound
    /// at the same time.
    #[default]
    Independent,
    /// Radio goes through the session store, so starting one stops the other.
    SharedSession,
}

/// Session store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ask the engine to start playing as soon as the item is buffered.
    ///
    /// Default: true.
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,

    /// Expand the player (`is_minimized = false`) whenever a new item starts.
    ///
    /// Default: true.
    #[serde(default = "default_expand_on_play")]
    pub expand_on_play: bool,

    /// Minimum spacing between `PositionChanged` events. `0` publishes every tick.
    ///
    /// Default: 1000 ms.
    #[serde(default = "default_position_event_interval_ms")]
    pub position_event_interval_ms: u64,

    /// Applied once by `SessionStore::initialize`.
    #[serde(default)]
    pub audio_mode: AudioMode,

    #[serde(default)]
    pub radio_policy: RadioPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autoplay: default_autoplay(),
            expand_on_play: default_expand_on_play(),
            position_event_interval_ms: default_position_event_interval_ms(),
            audio_mode: AudioMode::default(),
            radio_policy: RadioPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_radio_policy(mut self, policy: RadioPolicy) -> Self {
        self.radio_policy = policy;
        self
    }

    pub fn with_position_event_interval_ms(mut self, interval_ms: u64) -> Self {
        self.position_event_interval_ms = interval_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.position_event_interval_ms > 60_000 {
            return Err(PlaybackError::InvalidConfig(
                "position_event_interval_ms cannot exceed 60000".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_autoplay() -> bool {
    true
}

fn default_expand_on_play() -> bool {
    true
}

fn default_position_event_interval_ms() -> u64 {
    1000
}
