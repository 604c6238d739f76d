//! Result values for store and radio actions.

use crate::error::PlaybackError;

/// What an action actually did.
///
/// Actions never return `Err`: surfaces call them from event handlers and
/// inspect the outcome when they care. Engine failures are also logged.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "an action outcome reports whether the request took effect"]
pub enum ActionOutcome {
    /// The request reached the engine and the session reflects it.
    Applied,
    /// Nothing to do (no resource loaded, flag already set...).
    NoOp,
    /// A newer `play_item`/`stop_playback` overtook this request.
    Superseded,
    Failed(PlaybackError),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, ActionOutcome::NoOp)
    }

    pub fn error(&self) -> Option<&PlaybackError> {
        match self {
            ActionOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}
