//! # Event Bus System
//!
//! Typed, broadcast-based notifications for hosts that want to observe the
//! core without polling it (analytics, lock-screen widgets, debug overlays).
//!
//! ## Overview
//!
//! - **Event Types**: one enum per domain, wrapped in [`CoreEvent`]
//! - **EventBus**: central `tokio::sync::broadcast` channel
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ```text
//! ┌───────────────┐   emit   ┌───────────┐  subscribe  ┌────────────┐
//! │ Session Store ├─────────>│           ├────────────>│ Subscriber │
//! └───────────────┘          │ EventBus  │             └────────────┘
//! ┌───────────────┐   emit   │ (broadcast│  subscribe  ┌────────────┐
//! │ Radio Station ├─────────>│  channel) ├────────────>│ Subscriber │
//! └───────────────┘          │           │             └────────────┘
//! ┌───────────────┐   emit   │           │
//! │ Catalog       ├─────────>│           │
//! └───────────────┘          └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, EventStream, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = EventStream::new(bus.subscribe())
//!     .filter(|event| matches!(event, CoreEvent::Playback(_)));
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::Started {
//!     item_id: "s1".to_string(),
//!     title: "Grace Abounds".to_string(),
//! }))
//! .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Playback started");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal.
//! - **`RecvError::Closed`**: every sender was dropped; treat it as shutdown.
//!
//! Emitting with no subscriber returns `Err(SendError)`. Publishers in this
//! workspace ignore that case.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the [`EventBus`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Shared playback session events
    Playback(PlaybackEvent),
    /// Live radio slot events
    Radio(RadioEvent),
    /// Data collaborator events
    Catalog(CatalogEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Radio(e) => e.description(),
            CoreEvent::Catalog(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Radio(RadioEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Catalog(CatalogEvent::FetchFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::Started { .. })
            | CoreEvent::Playback(PlaybackEvent::Stopped { .. })
            | CoreEvent::Radio(RadioEvent::Playing { .. })
            | CoreEvent::Radio(RadioEvent::Stopped { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the shared playback session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A new item was handed to the engine.
    Loading { item_id: String, title: String },
    /// The first playing tick arrived for the current item.
    Started { item_id: String, title: String },
    Paused { item_id: String, position_ms: u64 },
    Resumed { item_id: String, position_ms: u64 },
    /// The session was torn down (explicit stop or shutdown).
    Stopped { item_id: String },
    /// Throttled position report.
    PositionChanged {
        item_id: String,
        position_ms: u64,
        duration_ms: u64,
    },
    /// The mini-player was minimized or expanded.
    PresentationChanged { is_minimized: bool },
    Error {
        item_id: Option<String>,
        message: String,
        /// Whether `retry` can be attempted.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Loading { .. } => "Playback loading",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::PresentationChanged { .. } => "Player presentation changed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Radio Events
// ============================================================================

/// Events emitted by the live radio slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum RadioEvent {
    Connecting { stream_id: String },
    Playing { stream_id: String },
    Paused { stream_id: String },
    /// The stream was disconnected and its resource released.
    Stopped { stream_id: String },
    Error {
        stream_id: Option<String>,
        message: String,
    },
}

impl RadioEvent {
    fn description(&self) -> &str {
        match self {
            RadioEvent::Connecting { .. } => "Radio connecting",
            RadioEvent::Playing { .. } => "Radio playing",
            RadioEvent::Paused { .. } => "Radio paused",
            RadioEvent::Stopped { .. } => "Radio stopped",
            RadioEvent::Error { .. } => "Radio error",
        }
    }
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Events emitted by the data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// A remote query failed.
    FetchFailed { query: String, message: String },
    /// A fallback result was returned in place of remote data.
    FallbackServed {
        query: String,
        /// `true` when demo content was served, `false` for an empty result.
        placeholder: bool,
    },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::FetchFailed { .. } => "Catalog fetch failed",
            CatalogEvent::FallbackServed { .. } => "Catalog fallback served",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus clones the sender; every `subscribe()` creates an
/// independent receiver that sees all future events. Slow subscribers get
/// `RecvError::Lagged` instead of blocking publishers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(id: &str) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::Started {
            item_id: id.to_string(),
            title: format!("Sermon {}", id),
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(started("s1")).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Radio(RadioEvent::Playing {
            stream_id: "radio-1".to_string(),
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Playback(_)));

        bus.emit(CoreEvent::Catalog(CatalogEvent::FetchFailed {
            query: "categories".to_string(),
            message: "HTTP 500".to_string(),
        }))
        .ok();
        bus.emit(started("s2")).ok();

        assert_eq!(stream.recv().await.unwrap(), started("s2"));
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for position_ms in 0..5 {
            bus.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                item_id: "s1".to_string(),
                position_ms,
                duration_ms: 30_000,
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let error_event = CoreEvent::Playback(PlaybackEvent::Error {
            item_id: Some("s1".to_string()),
            message: "unreachable".to_string(),
            recoverable: true,
        });
        assert_eq!(error_event.severity(), EventSeverity::Error);
        assert_eq!(started("s1").severity(), EventSeverity::Info);

        let fetch = CoreEvent::Catalog(CatalogEvent::FetchFailed {
            query: "sermons".to_string(),
            message: "timeout".to_string(),
        });
        assert_eq!(fetch.severity(), EventSeverity::Warning);

        let tick = CoreEvent::Playback(PlaybackEvent::PositionChanged {
            item_id: "s1".to_string(),
            position_ms: 5000,
            duration_ms: 180000,
        });
        assert_eq!(tick.severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Playback(PlaybackEvent::PresentationChanged { is_minimized: true });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Playback\""));
        assert!(json.contains("\"event\":\"PresentationChanged\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv() {
        let bus = EventBus::default();
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());

        bus.emit(started("s3")).ok();
        let received = stream.try_recv().unwrap().unwrap();
        assert_eq!(received.description(), "Playback started");
    }
}
