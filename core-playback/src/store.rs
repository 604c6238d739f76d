//! # Playback Session Store
//!
//! Single source of truth for the shared playback session and exclusive owner
//! of its engine resource.
//!
//! ## Overview
//!
//! A [`SessionStore`] is constructed once at application start and cloned into
//! every consumer surface (clones share state). Surfaces read
//! [`SessionSnapshot`]s through [`SessionStore::snapshot`] or
//! [`SessionStore::subscribe`], and mutate the session only through the async
//! actions below, each of which returns an [`ActionOutcome`].
//!
//! ## Resource lifecycle
//!
//! - Mutating actions serialize on an internal operation lock, so teardown of
//!   the previous resource always completes before the next `load` begins.
//! - `play_item` releases that lock while the engine loads. Every
//!   `play_item`/`stop_playback` bumps a generation counter; when a load
//!   resolves under an outdated generation its resource is unloaded at once
//!   and the call reports [`ActionOutcome::Superseded`].
//! - Status ticks reach the session through a [`StatusSubscription`] that is
//!   revoked when its resource is released. Ticks are additionally checked
//!   against the current handle and generation before they are applied.
//!
//! ## Example
//!
//! ```ignore
//! let store = SessionStore::builder(engine)
//!     .config(SessionConfig::default())
//!     .event_bus(bus.clone())
//!     .build()?;
//! store.initialize().await;
//!
//! let outcome = store.play_item(item).await;
//! if let Some(err) = outcome.error() {
//!     show_retry_banner(err);
//! }
//! ```

use crate::config::SessionConfig;
use crate::error::{PlaybackError, Result};
use crate::outcome::ActionOutcome;
use crate::subscription::{subscribe, StatusSubscription, SubscriptionGuard};
use crate::types::{PlayableItem, SessionSnapshot, TransportState};
use bridge_traits::{
    Clock, EngineHandle, EngineStatus, LoadRequest, PlaybackEngine, PlaybackStatus, SystemClock,
};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, info, instrument, trace, warn};

/// The one live engine resource bound to the current item.
struct ActiveResource {
    generation: u64,
    guard: SubscriptionGuard,
}

impl ActiveResource {
    fn handle(&self) -> EngineHandle {
        self.guard.handle()
    }

    fn matches(&self, generation: u64, handle: EngineHandle) -> bool {
        self.generation == generation && self.handle() == handle
    }
}

struct StoreInner {
    engine: Arc<dyn PlaybackEngine>,
    config: SessionConfig,
    op_lock: AsyncMutex<()>,
    active: Mutex<Option<ActiveResource>>,
    generation: AtomicU64,
    state: watch::Sender<SessionSnapshot>,
    events: Option<EventBus>,
    clock: Arc<dyn Clock>,
    last_position_event_ms: Mutex<Option<i64>>,
}

/// Builder for [`SessionStore`].
pub struct SessionStoreBuilder {
    engine: Arc<dyn PlaybackEngine>,
    config: SessionConfig,
    events: Option<EventBus>,
    clock: Option<Arc<dyn Clock>>,
}

impl SessionStoreBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish `CoreEvent::Playback` events on `bus`.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Time source for position event throttling.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<SessionStore> {
        self.config.validate()?;
        Ok(SessionStore::from_parts(
            self.engine,
            self.config,
            self.events,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        ))
    }
}

/// Handle to the shared playback session. Cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.inner.state.borrow();
        f.debug_struct("SessionStore")
            .field("current_item", &snapshot.current_item_id())
            .field("transport_state", &snapshot.transport_state)
            .field("has_active_resource", &self.has_active_resource())
            .finish()
    }
}

impl SessionStore {
    /// Store with the default configuration and no event bus.
    pub fn new(engine: Arc<dyn PlaybackEngine>) -> Self {
        Self::from_parts(
            engine,
            SessionConfig::default(),
            None,
            Arc::new(SystemClock),
        )
    }

    pub fn builder(engine: Arc<dyn PlaybackEngine>) -> SessionStoreBuilder {
        SessionStoreBuilder {
            engine,
            config: SessionConfig::default(),
            events: None,
            clock: None,
        }
    }

    fn from_parts(
        engine: Arc<dyn PlaybackEngine>,
        config: SessionConfig,
        events: Option<EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                engine,
                config,
                op_lock: AsyncMutex::new(()),
                active: Mutex::new(None),
                generation: AtomicU64::new(0),
                state,
                events,
                clock,
                last_position_event_ms: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Whether an engine resource is currently bound to the session.
    pub fn has_active_resource(&self) -> bool {
        self.inner.active.lock().is_some()
    }

    /// Apply the configured audio mode to the engine. Failure is not fatal.
    pub async fn initialize(&self) -> ActionOutcome {
        let mode = self.inner.config.audio_mode;
        match self.inner.engine.configure_audio_mode(mode).await {
            Ok(()) => {
                debug!(?mode, "Audio mode configured");
                ActionOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "Failed to configure audio mode");
                ActionOutcome::Failed(e.into())
            }
        }
    }

    /// Replace whatever is loaded with `item` and start loading it.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn play_item(&self, item: PlayableItem) -> ActionOutcome {
        let inner = &self.inner;

        let generation = {
            let _op = inner.op_lock.lock().await;
            let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

            if let Some(previous) = inner.take_active() {
                debug!(handle = %previous.handle(), "Releasing previous resource");
                inner.release(previous, false).await;
            }

            let expand = inner.config.expand_on_play;
            inner.state.send_modify(|s| {
                s.current_item = Some(item.clone());
                s.transport_state = TransportState::Loading;
                s.position_ms = 0;
                s.duration_ms = 0;
                s.is_buffering = false;
                s.last_error = None;
                if expand {
                    s.is_minimized = false;
                }
            });
            *inner.last_position_event_ms.lock() = None;

            inner.publish(PlaybackEvent::Loading {
                item_id: item.id.clone(),
                title: item.title.clone(),
            });
            generation
        };

        let request =
            LoadRequest::new(item.audio_url.clone()).with_autoplay(inner.config.autoplay);
        let loaded = inner.engine.load(request).await;

        let _op = inner.op_lock.lock().await;

        if inner.generation.load(Ordering::SeqCst) != generation {
            if let Ok(sound) = loaded {
                debug!(handle = %sound.handle, "Unloading resource of superseded request");
                if let Err(e) = inner.engine.unload(sound.handle).await {
                    warn!(handle = %sound.handle, error = %e, "Failed to unload superseded resource");
                }
            }
            return ActionOutcome::Superseded;
        }

        match loaded {
            Ok(sound) => {
                let (guard, subscription) = subscribe(sound);
                let handle = guard.handle();
                *inner.active.lock() = Some(ActiveResource { generation, guard });

                let nominal = if inner.config.autoplay {
                    TransportState::Playing
                } else {
                    TransportState::Paused
                };
                inner.set_transport(nominal);

                spawn_forwarder(Arc::downgrade(&self.inner), generation, subscription);
                info!(%handle, generation, "Playback resource loaded");
                ActionOutcome::Applied
            }
            Err(e) => {
                let error = PlaybackError::load_failed(&item.audio_url, e);
                warn!(error = %error, "Failed to load item");
                inner.enter_error(error.clone());
                ActionOutcome::Failed(error)
            }
        }
    }

    /// Pause when playing, play otherwise. No-op without a loaded resource.
    pub async fn toggle_play_pause(&self) -> ActionOutcome {
        let inner = &self.inner;
        let _op = inner.op_lock.lock().await;

        let Some(handle) = inner.active_handle() else {
            debug!("Toggle ignored: no resource loaded");
            return ActionOutcome::NoOp;
        };

        let was_playing = inner.state.borrow().transport_state == TransportState::Playing;
        let result = if was_playing {
            inner.engine.pause(handle).await
        } else {
            inner.engine.play(handle).await
        };

        match result {
            Ok(()) => {
                inner.set_transport(if was_playing {
                    TransportState::Paused
                } else {
                    TransportState::Playing
                });
                ActionOutcome::Applied
            }
            Err(e) => {
                let error = PlaybackError::from(e);
                warn!(%handle, error = %error, "Failed to toggle playback");
                ActionOutcome::Failed(error)
            }
        }
    }

    /// Move the playhead. The engine receives the position uncorrected; the
    /// snapshot keeps `position_ms <= duration_ms` once the duration is known.
    pub async fn seek_to(&self, position_ms: u64) -> ActionOutcome {
        let inner = &self.inner;
        let _op = inner.op_lock.lock().await;

        let Some(handle) = inner.active_handle() else {
            debug!(position_ms, "Seek ignored: no resource loaded");
            return ActionOutcome::NoOp;
        };

        match inner.engine.seek(handle, position_ms).await {
            Ok(()) => {
                inner.state.send_modify(|s| {
                    s.position_ms = if s.duration_ms > 0 {
                        position_ms.min(s.duration_ms)
                    } else {
                        position_ms
                    };
                });
                ActionOutcome::Applied
            }
            Err(e) => {
                let error = PlaybackError::from(e);
                warn!(%handle, position_ms, error = %error, "Failed to seek");
                ActionOutcome::Failed(error)
            }
        }
    }

    /// Set gain, clamped to `0.0..=1.0`.
    pub async fn set_volume(&self, volume: f32) -> ActionOutcome {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };

        let inner = &self.inner;
        let _op = inner.op_lock.lock().await;
        let Some(handle) = inner.active_handle() else {
            return ActionOutcome::NoOp;
        };

        match inner.engine.set_volume(handle, volume).await {
            Ok(()) => {
                inner.state.send_modify(|s| s.volume = volume);
                ActionOutcome::Applied
            }
            Err(e) => {
                let error = PlaybackError::from(e);
                warn!(%handle, volume, error = %error, "Failed to set volume");
                ActionOutcome::Failed(error)
            }
        }
    }

    pub async fn toggle_mute(&self) -> ActionOutcome {
        let inner = &self.inner;
        let _op = inner.op_lock.lock().await;
        let Some(handle) = inner.active_handle() else {
            return ActionOutcome::NoOp;
        };

        let muted = !inner.state.borrow().is_muted;
        match inner.engine.set_muted(handle, muted).await {
            Ok(()) => {
                inner.state.send_modify(|s| s.is_muted = muted);
                ActionOutcome::Applied
            }
            Err(e) => {
                let error = PlaybackError::from(e);
                warn!(%handle, muted, error = %error, "Failed to toggle mute");
                ActionOutcome::Failed(error)
            }
        }
    }

    /// Stop, unload and reset the session to Idle. Idempotent.
    #[instrument(skip(self))]
    pub async fn stop_playback(&self) -> ActionOutcome {
        let inner = &self.inner;
        let _op = inner.op_lock.lock().await;

        inner.generation.fetch_add(1, Ordering::SeqCst);
        let resource = inner.take_active();
        let item_id = inner.state.borrow().current_item_id().map(str::to_string);

        if resource.is_none() && item_id.is_none() {
            return ActionOutcome::NoOp;
        }

        if let Some(resource) = resource {
            inner.release(resource, true).await;
        }

        inner.state.send_modify(|s| {
            s.current_item = None;
            s.transport_state = TransportState::Idle;
            s.position_ms = 0;
            s.duration_ms = 0;
            s.is_buffering = false;
            s.last_error = None;
        });

        if let Some(item_id) = item_id {
            info!(%item_id, "Playback stopped");
            inner.publish(PlaybackEvent::Stopped { item_id });
        }
        ActionOutcome::Applied
    }

    /// Pure presentation change. `NoOp` when the flag already has that value.
    pub fn set_minimized(&self, minimized: bool) -> ActionOutcome {
        let changed = self.inner.state.send_if_modified(|s| {
            if s.is_minimized == minimized {
                return false;
            }
            s.is_minimized = minimized;
            true
        });

        if !changed {
            return ActionOutcome::NoOp;
        }
        self.inner.publish(PlaybackEvent::PresentationChanged {
            is_minimized: minimized,
        });
        ActionOutcome::Applied
    }

    pub fn toggle_minimized(&self) -> ActionOutcome {
        let minimized = !self.inner.state.borrow().is_minimized;
        self.set_minimized(minimized)
    }

    /// Reload the retained item after a failure.
    pub async fn retry(&self) -> ActionOutcome {
        let item = {
            let snapshot = self.inner.state.borrow();
            match (&snapshot.transport_state, &snapshot.current_item) {
                (TransportState::Error, Some(item)) => item.clone(),
                _ => return ActionOutcome::NoOp,
            }
        };
        debug!(item_id = %item.id, "Retrying playback");
        self.play_item(item).await
    }

    /// Application-exit teardown.
    pub async fn shutdown(&self) -> ActionOutcome {
        info!("Shutting down playback session");
        self.stop_playback().await
    }
}

impl StoreInner {
    fn publish(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.emit(CoreEvent::Playback(event));
        }
    }

    fn take_active(&self) -> Option<ActiveResource> {
        self.active.lock().take()
    }

    fn active_handle(&self) -> Option<EngineHandle> {
        self.active.lock().as_ref().map(ActiveResource::handle)
    }

    /// Revoke the subscription and release the engine resource.
    async fn release(&self, resource: ActiveResource, stop_first: bool) {
        let handle = resource.handle();
        resource.guard.revoke();

        if stop_first {
            if let Err(e) = self.engine.stop(handle).await {
                warn!(%handle, error = %e, "Failed to stop engine resource");
            }
        }
        if let Err(e) = self.engine.unload(handle).await {
            warn!(%handle, error = %e, "Failed to unload engine resource");
        }
    }

    /// Set a nominal transport state after a successful engine request.
    fn set_transport(&self, next: TransportState) {
        let mut previous = next;
        self.state.send_if_modified(|s| {
            previous = s.transport_state;
            s.transport_state = next;
            previous != next
        });
        self.publish_transition(previous, next);
    }

    fn enter_error(&self, error: PlaybackError) {
        let mut item_id = None;
        self.state.send_modify(|s| {
            item_id = s.current_item_id().map(str::to_string);
            s.transport_state = TransportState::Error;
            s.is_buffering = false;
            s.last_error = Some(error.clone());
        });
        self.publish(PlaybackEvent::Error {
            item_id,
            message: error.to_string(),
            recoverable: error.is_transient(),
        });
    }

    fn publish_transition(&self, previous: TransportState, next: TransportState) {
        if previous == next || self.events.is_none() {
            return;
        }
        let snapshot = self.state.borrow().clone();
        let Some(item) = snapshot.current_item else {
            return;
        };

        let event = match (previous, next) {
            (TransportState::Loading, TransportState::Playing) => PlaybackEvent::Started {
                item_id: item.id,
                title: item.title,
            },
            (TransportState::Paused, TransportState::Playing) => PlaybackEvent::Resumed {
                item_id: item.id,
                position_ms: snapshot.position_ms,
            },
            (TransportState::Playing, TransportState::Paused) => PlaybackEvent::Paused {
                item_id: item.id,
                position_ms: snapshot.position_ms,
            },
            _ => return,
        };
        self.publish(event);
    }

    fn position_event_due(&self) -> bool {
        let interval = self.config.position_event_interval_ms as i64;
        let now = self.clock.unix_timestamp_millis();
        let mut last = self.last_position_event_ms.lock();
        match *last {
            Some(previous) if now.saturating_sub(previous) < interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Apply one status tick if it still belongs to the active resource.
    fn apply_status(&self, generation: u64, handle: EngineHandle, status: &PlaybackStatus) {
        let mut previous = TransportState::Idle;
        let mut next = TransportState::Idle;
        let mut position_moved = false;

        {
            let active = self.active.lock();
            if !active
                .as_ref()
                .map_or(false, |resource| resource.matches(generation, handle))
            {
                trace!(%handle, "Discarding status from released resource");
                return;
            }

            self.state.send_if_modified(|s| {
                previous = s.transport_state;
                next = previous;

                if !status.is_loaded {
                    let changed = s.is_buffering != status.is_buffering;
                    s.is_buffering = status.is_buffering;
                    return changed;
                }

                next = if status.is_playing {
                    TransportState::Playing
                } else {
                    TransportState::Paused
                };
                position_moved = s.position_ms != status.position_ms;

                let changed = previous != next
                    || position_moved
                    || s.duration_ms != status.duration_ms
                    || s.is_buffering != status.is_buffering
                    || s.is_muted != status.is_muted
                    || s.volume != status.volume;

                s.transport_state = next;
                s.position_ms = status.position_ms;
                s.duration_ms = status.duration_ms;
                s.is_buffering = status.is_buffering;
                s.is_muted = status.is_muted;
                s.volume = status.volume;
                changed
            });
        }

        self.publish_transition(previous, next);

        if position_moved && self.events.is_some() && self.position_event_due() {
            let snapshot = self.state.borrow();
            if let Some(item_id) = snapshot.current_item_id() {
                let event = PlaybackEvent::PositionChanged {
                    item_id: item_id.to_string(),
                    position_ms: snapshot.position_ms,
                    duration_ms: snapshot.duration_ms,
                };
                drop(snapshot);
                self.publish(event);
            }
        }
    }

    /// The engine gave up on the active resource: keep the item, drop the resource.
    async fn fail_resource(&self, generation: u64, handle: EngineHandle, message: String) {
        let _op = self.op_lock.lock().await;

        let resource = {
            let mut active = self.active.lock();
            match active.as_ref() {
                Some(resource) if resource.matches(generation, handle) => active.take(),
                _ => None,
            }
        };
        let Some(resource) = resource else {
            trace!(%handle, "Ignoring failure from released resource");
            return;
        };

        warn!(%handle, %message, "Engine reported a playback failure");
        self.release(resource, false).await;
        self.enter_error(PlaybackError::StreamFailed(message));
    }
}

/// Pump statuses from `subscription` into the session until it is revoked.
fn spawn_forwarder(inner: Weak<StoreInner>, generation: u64, mut subscription: StatusSubscription) {
    tokio::spawn(async move {
        let handle = subscription.handle();
        while let Some(status) = subscription.next().await {
            let Some(inner) = inner.upgrade() else {
                break;
            };
            match status {
                EngineStatus::Update(status) => inner.apply_status(generation, handle, &status),
                EngineStatus::Failed { message } => {
                    inner.fail_resource(generation, handle, message).await;
                    break;
                }
            }
        }
        trace!(%handle, "Status forwarder finished");
    });
}
