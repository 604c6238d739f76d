//! # Playback Session Module
//!
//! Owns the shared playback session: which item is loaded, its transport
//! state and progress, and the single engine resource bound to it.
//!
//! ## Overview
//!
//! This module handles:
//! - The [`SessionStore`], single writer of the session and exclusive owner
//!   of its engine handle
//! - Cancellable status subscriptions so ticks from released resources are
//!   dropped structurally
//! - Consumer surface projections (cards, detail screen, mini-player)
//! - The live radio slot, either independent or routed through the session
//!
//! Every action returns an [`ActionOutcome`] instead of an error; failures
//! also land in [`SessionSnapshot::last_error`] and the logs.

pub mod config;
pub mod error;
pub mod outcome;
pub mod radio;
pub mod store;
pub mod subscription;
pub mod surfaces;
pub mod types;

pub use config::{RadioPolicy, SessionConfig};
pub use error::{PlaybackError, Result};
pub use outcome::ActionOutcome;
pub use radio::{RadioSnapshot, RadioStation};
pub use store::{SessionStore, SessionStoreBuilder};
pub use surfaces::{
    format_clock_ms, format_duration_secs, press_play, seek_to_fraction, CardView, DetailView,
    MiniPlayerView,
};
pub use types::{PlayableItem, SessionSnapshot, TransportState};
