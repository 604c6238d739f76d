//! # Playback Error Types
//!
//! Errors surfaced by the session store and radio slot. They are cloneable so
//! they can live inside [`SessionSnapshot`](crate::types::SessionSnapshot) and
//! [`ActionOutcome`](crate::outcome::ActionOutcome).

use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// The engine could not open the item's audio URL.
    #[error("Failed to load {uri}: {reason}")]
    LoadFailed { uri: String, reason: String },

    /// The engine reported a failure for a resource that was already playing.
    #[error("Stream failed: {0}")]
    StreamFailed(String),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// A transport request (play, pause, seek...) was rejected by the engine.
    #[error("Engine operation failed: {0}")]
    EngineFailed(String),

    /// The handle no longer refers to a live resource.
    #[error("Stale engine handle: {0}")]
    StaleHandle(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Wrap a load failure, keeping the engine's own `LoadFailed` details.
    pub fn load_failed(uri: &str, err: BridgeError) -> Self {
        match err {
            BridgeError::LoadFailed { uri, reason } => PlaybackError::LoadFailed { uri, reason },
            other => PlaybackError::LoadFailed {
                uri: uri.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Returns `true` if retrying the same item may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::LoadFailed { .. }
                | PlaybackError::StreamFailed(_)
                | PlaybackError::EngineFailed(_)
        )
    }
}

impl From<BridgeError> for PlaybackError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::LoadFailed { uri, reason } => PlaybackError::LoadFailed { uri, reason },
            BridgeError::StaleHandle(handle) => PlaybackError::StaleHandle(handle),
            other => PlaybackError::EngineFailed(other.to_string()),
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
