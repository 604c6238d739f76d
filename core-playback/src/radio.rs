//! # Live Radio Slot
//!
//! Plays one live stream with the radio screen's button semantics: pause when
//! playing, resume when loaded, otherwise connect with autoplay.
//!
//! Two policies are available (see [`RadioPolicy`]):
//!
//! - **Independent**: the station owns its own engine resource, outside the
//!   session store. A sermon and the radio may sound together.
//! - **SharedSession**: the stream is routed through
//!   [`SessionStore::play_item`], so radio and sermons share one slot.

use crate::config::RadioPolicy;
use crate::error::PlaybackError;
use crate::outcome::ActionOutcome;
use crate::store::SessionStore;
use crate::subscription::{subscribe, StatusSubscription, SubscriptionGuard};
use crate::surfaces::press_play;
use crate::types::{PlayableItem, TransportState};
use bridge_traits::{EngineHandle, EngineStatus, LoadRequest, PlaybackEngine};
use core_runtime::events::{CoreEvent, EventBus, RadioEvent};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, info, trace, warn};

/// What the radio screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadioSnapshot {
    /// Stream last toggled on this station.
    pub stream: Option<PlayableItem>,
    pub is_playing: bool,
    pub is_loading: bool,
    pub last_error: Option<PlaybackError>,
}

impl RadioSnapshot {
    pub fn stream_id(&self) -> Option<&str> {
        self.stream.as_ref().map(|s| s.id.as_str())
    }
}

struct StationResource {
    generation: u64,
    stream_id: String,
    guard: SubscriptionGuard,
}

struct StationInner {
    engine: Arc<dyn PlaybackEngine>,
    op_lock: AsyncMutex<()>,
    active: Mutex<Option<StationResource>>,
    generation: AtomicU64,
    state: watch::Sender<RadioSnapshot>,
    events: Mutex<Option<EventBus>>,
}

enum Backend {
    Independent(Arc<StationInner>),
    Shared {
        session: SessionStore,
        stream: Arc<Mutex<Option<PlayableItem>>>,
    },
}

/// Live radio player. Cheap to clone.
#[derive(Clone)]
pub struct RadioStation {
    backend: Arc<Backend>,
}

impl fmt::Debug for RadioStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadioStation")
            .field("policy", &self.policy())
            .field("is_playing", &self.is_playing())
            .finish()
    }
}

impl RadioStation {
    /// Station with its own engine resource.
    pub fn independent(engine: Arc<dyn PlaybackEngine>) -> Self {
        let (state, _) = watch::channel(RadioSnapshot::default());
        Self {
            backend: Arc::new(Backend::Independent(Arc::new(StationInner {
                engine,
                op_lock: AsyncMutex::new(()),
                active: Mutex::new(None),
                generation: AtomicU64::new(0),
                state,
                events: Mutex::new(None),
            }))),
        }
    }

    /// Station that plays through the shared session.
    pub fn shared(session: SessionStore) -> Self {
        Self {
            backend: Arc::new(Backend::Shared {
                session,
                stream: Arc::new(Mutex::new(None)),
            }),
        }
    }

    /// Publish `CoreEvent::Radio` events. Shared stations publish through the
    /// session store instead.
    pub fn with_event_bus(self, bus: EventBus) -> Self {
        if let Backend::Independent(inner) = self.backend.as_ref() {
            *inner.events.lock() = Some(bus);
        }
        self
    }

    pub fn policy(&self) -> RadioPolicy {
        match self.backend.as_ref() {
            Backend::Independent(_) => RadioPolicy::Independent,
            Backend::Shared { .. } => RadioPolicy::SharedSession,
        }
    }

    pub fn snapshot(&self) -> RadioSnapshot {
        match self.backend.as_ref() {
            Backend::Independent(inner) => inner.state.borrow().clone(),
            Backend::Shared { session, stream } => {
                let stream = stream.lock().clone();
                let session = session.snapshot();
                let Some(current) = stream.as_ref().filter(|s| session.is_current(&s.id)) else {
                    return RadioSnapshot {
                        stream,
                        ..RadioSnapshot::default()
                    };
                };
                let state = session.transport_state;
                RadioSnapshot {
                    is_playing: session.is_playing_item(&current.id),
                    is_loading: state == TransportState::Loading,
                    last_error: session.last_error.clone(),
                    stream,
                }
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.snapshot().is_playing
    }

    /// Radio screen play/pause button.
    pub async fn toggle(&self, stream: PlayableItem) -> ActionOutcome {
        match self.backend.as_ref() {
            Backend::Independent(inner) => inner.toggle(stream).await,
            Backend::Shared {
                session,
                stream: current,
            } => {
                *current.lock() = Some(stream.clone());
                press_play(session, &stream).await
            }
        }
    }

    /// Disconnect and release the stream.
    pub async fn stop(&self) -> ActionOutcome {
        match self.backend.as_ref() {
            Backend::Independent(inner) => inner.stop().await,
            Backend::Shared { session, stream } => {
                let stream = stream.lock().take();
                match stream {
                    Some(stream) if session.snapshot().is_current(&stream.id) => {
                        session.stop_playback().await
                    }
                    _ => ActionOutcome::NoOp,
                }
            }
        }
    }
}

impl StationInner {
    fn publish(&self, event: RadioEvent) {
        if let Some(bus) = self.events.lock().as_ref() {
            let _ = bus.emit(CoreEvent::Radio(event));
        }
    }

    fn loaded_stream(&self) -> Option<(EngineHandle, String)> {
        self.active
            .lock()
            .as_ref()
            .map(|r| (r.guard.handle(), r.stream_id.clone()))
    }

    async fn release(&self, resource: StationResource, stop_first: bool) {
        let handle = resource.guard.handle();
        resource.guard.revoke();
        if stop_first {
            if let Err(e) = self.engine.stop(handle).await {
                warn!(%handle, error = %e, "Failed to stop radio stream");
            }
        }
        if let Err(e) = self.engine.unload(handle).await {
            warn!(%handle, error = %e, "Failed to unload radio stream");
        }
    }

    async fn toggle(self: &Arc<Self>, stream: PlayableItem) -> ActionOutcome {
        let generation = {
            let _op = self.op_lock.lock().await;

            match self.loaded_stream() {
                Some((handle, loaded_id)) if loaded_id == stream.id => {
                    return self.toggle_loaded(handle, stream.id).await;
                }
                _ => {}
            }

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let previous = self.active.lock().take();
            if let Some(previous) = previous {
                debug!(stream_id = %previous.stream_id, "Switching radio stream");
                self.release(previous, true).await;
            }

            self.state.send_modify(|s| {
                s.stream = Some(stream.clone());
                s.is_playing = false;
                s.is_loading = true;
                s.last_error = None;
            });
            self.publish(RadioEvent::Connecting {
                stream_id: stream.id.clone(),
            });
            generation
        };

        let loaded = self
            .engine
            .load(LoadRequest::new(stream.audio_url.clone()).with_autoplay(true))
            .await;

        let _op = self.op_lock.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            if let Ok(sound) = loaded {
                if let Err(e) = self.engine.unload(sound.handle).await {
                    warn!(handle = %sound.handle, error = %e, "Failed to unload superseded radio stream");
                }
            }
            return ActionOutcome::Superseded;
        }

        match loaded {
            Ok(sound) => {
                let (guard, subscription) = subscribe(sound);
                let handle = guard.handle();
                *self.active.lock() = Some(StationResource {
                    generation,
                    stream_id: stream.id.clone(),
                    guard,
                });
                self.state.send_modify(|s| {
                    s.is_loading = false;
                    s.is_playing = true;
                });
                spawn_forwarder(Arc::downgrade(self), generation, subscription);
                info!(stream_id = %stream.id, %handle, "Radio stream connected");
                self.publish(RadioEvent::Playing {
                    stream_id: stream.id,
                });
                ActionOutcome::Applied
            }
            Err(e) => {
                let error = PlaybackError::load_failed(&stream.audio_url, e);
                warn!(stream_id = %stream.id, error = %error, "Failed to connect radio stream");
                self.fail(Some(stream.id), error.clone());
                ActionOutcome::Failed(error)
            }
        }
    }

    async fn toggle_loaded(&self, handle: EngineHandle, stream_id: String) -> ActionOutcome {
        let was_playing = self.state.borrow().is_playing;
        let result = if was_playing {
            self.engine.pause(handle).await
        } else {
            self.engine.play(handle).await
        };

        match result {
            Ok(()) => {
                self.state.send_modify(|s| s.is_playing = !was_playing);
                self.publish(if was_playing {
                    RadioEvent::Paused { stream_id }
                } else {
                    RadioEvent::Playing { stream_id }
                });
                ActionOutcome::Applied
            }
            Err(e) => {
                let error = PlaybackError::from(e);
                warn!(%handle, error = %error, "Failed to toggle radio stream");
                ActionOutcome::Failed(error)
            }
        }
    }

    async fn stop(&self) -> ActionOutcome {
        let _op = self.op_lock.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);

        let resource = self.active.lock().take();
        let stream_id = self.state.borrow().stream_id().map(str::to_string);
        if resource.is_none() && stream_id.is_none() {
            return ActionOutcome::NoOp;
        }
        let stream_id = match resource {
            Some(resource) => {
                let stream_id = resource.stream_id.clone();
                self.release(resource, true).await;
                Some(stream_id)
            }
            None => stream_id,
        };
        self.state.send_replace(RadioSnapshot::default());
        if let Some(stream_id) = stream_id {
            info!(%stream_id, "Radio stopped");
            self.publish(RadioEvent::Stopped { stream_id });
        }
        ActionOutcome::Applied
    }

    fn fail(&self, stream_id: Option<String>, error: PlaybackError) {
        self.state.send_modify(|s| {
            s.is_playing = false;
            s.is_loading = false;
            s.last_error = Some(error.clone());
        });
        self.publish(RadioEvent::Error {
            stream_id,
            message: error.to_string(),
        });
    }

    fn apply_status(&self, generation: u64, handle: EngineHandle, is_loaded: bool, is_playing: bool) {
        let active = self.active.lock();
        let current = active
            .as_ref()
            .is_some_and(|r| r.generation == generation && r.guard.handle() == handle);
        if !current {
            trace!(%handle, "Discarding status from released radio stream");
            return;
        }
        if !is_loaded {
            return;
        }
        self.state.send_if_modified(|s| {
            let changed = s.is_playing != is_playing || s.is_loading;
            s.is_playing = is_playing;
            s.is_loading = false;
            changed
        });
    }

    async fn fail_resource(&self, generation: u64, handle: EngineHandle, message: String) {
        let _op = self.op_lock.lock().await;
        let resource = {
            let mut active = self.active.lock();
            match active.as_ref() {
                Some(r) if r.generation == generation && r.guard.handle() == handle => {
                    active.take()
                }
                _ => None,
            }
        };
        let Some(resource) = resource else {
            return;
        };
        warn!(%handle, %message, "Radio stream failed");
        let stream_id = resource.stream_id.clone();
        self.release(resource, false).await;
        self.fail(Some(stream_id), PlaybackError::StreamFailed(message));
    }
}

fn spawn_forwarder(inner: Weak<StationInner>, generation: u64, mut subscription: StatusSubscription) {
    tokio::spawn(async move {
        let handle = subscription.handle();
        while let Some(status) = subscription.next().await {
            let Some(inner) = inner.upgrade() else {
                break;
            };
            match status {
                EngineStatus::Update(status) => {
                    inner.apply_status(generation, handle, status.is_loaded, status.is_playing)
                }
                EngineStatus::Failed { message } => {
                    inner.fail_resource(generation, handle, message).await;
                    break;
                }
            }
        }
        trace!(%handle, "Radio forwarder finished");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{status_channel, AudioMode, BridgeError, LoadedSound};
    use mockall::{mock, predicate::*};

    mock! {
        pub Engine {}

        #[async_trait]
        impl PlaybackEngine for Engine {
            async fn configure_audio_mode(&self, mode: AudioMode) -> BridgeResult<()>;
            async fn load(&self, request: LoadRequest) -> BridgeResult<LoadedSound>;
            async fn play(&self, handle: EngineHandle) -> BridgeResult<()>;
            async fn pause(&self, handle: EngineHandle) -> BridgeResult<()>;
            async fn stop(&self, handle: EngineHandle) -> BridgeResult<()>;
            async fn seek(&self, handle: EngineHandle, position_ms: u64) -> BridgeResult<()>;
            async fn set_volume(&self, handle: EngineHandle, volume: f32) -> BridgeResult<()>;
            async fn set_muted(&self, handle: EngineHandle, muted: bool) -> BridgeResult<()>;
            async fn unload(&self, handle: EngineHandle) -> BridgeResult<()>;
        }
    }

    fn compa_radio() -> PlayableItem {
        PlayableItem::new(
            "radio-1",
            "Compa Radio En Direct",
            "Compa Radio",
            "https://example.com/radio-stream",
        )
    }

    #[tokio::test]
    async fn test_toggle_connects_then_pauses_then_resumes() {
        let handle = EngineHandle::new();
        let (_tx, rx) = status_channel();
        let mut engine = MockEngine::new();
        engine
            .expect_load()
            .withf(|r| r.autoplay && r.uri == "https://example.com/radio-stream")
            .times(1)
            .return_once(move |_| Ok(LoadedSound::new(handle, rx)));
        engine
            .expect_pause()
            .with(eq(handle))
            .times(1)
            .returning(|_| Ok(()));
        engine
            .expect_play()
            .with(eq(handle))
            .times(1)
            .returning(|_| Ok(()));

        let station = RadioStation::independent(Arc::new(engine));

        assert!(station.toggle(compa_radio()).await.is_applied());
        assert!(station.is_playing());

        assert!(station.toggle(compa_radio()).await.is_applied());
        assert!(!station.is_playing());

        assert!(station.toggle(compa_radio()).await.is_applied());
        assert!(station.is_playing());
    }

    #[tokio::test]
    async fn test_connection_failure_is_reported() {
        let mut engine = MockEngine::new();
        engine.expect_load().returning(|r| {
            Err(BridgeError::LoadFailed {
                uri: r.uri,
                reason: "403".into(),
            })
        });

        let station = RadioStation::independent(Arc::new(engine));
        let outcome = station.toggle(compa_radio()).await;

        assert!(matches!(
            outcome,
            ActionOutcome::Failed(PlaybackError::LoadFailed { .. })
        ));
        let snapshot = station.snapshot();
        assert!(!snapshot.is_playing);
        assert!(!snapshot.is_loading);
        assert!(snapshot.last_error.is_some());
    }

    #[tokio::test]
    async fn test_stop_without_stream_is_noop() {
        let station = RadioStation::independent(Arc::new(MockEngine::new()));
        assert_eq!(station.stop().await, ActionOutcome::NoOp);
        assert_eq!(station.policy(), RadioPolicy::Independent);
    }
}
