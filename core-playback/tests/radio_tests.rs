//! Radio slot under both policies.

mod common;

use bridge_traits::{EngineStatus, PlaybackStatus};
use common::{sermon, settle, ScriptedEngine};
use core_playback::{
    ActionOutcome, PlayableItem, PlaybackError, RadioPolicy, RadioStation, SessionStore,
    TransportState,
};
use core_runtime::events::{CoreEvent, EventBus, RadioEvent};
use std::time::Duration;

fn live_stream() -> PlayableItem {
    PlayableItem::new(
        "radio-1",
        "Compa Radio En Direct",
        "Compa Radio",
        "https://example.com/radio-stream",
    )
}

#[tokio::test]
async fn independent_radio_plays_alongside_a_sermon() {
    let engine = ScriptedEngine::new();
    let store = SessionStore::new(engine.clone());
    let station = RadioStation::independent(engine.clone());

    assert!(store.play_item(sermon("s1")).await.is_applied());
    assert!(station.toggle(live_stream()).await.is_applied());

    assert_eq!(engine.live_count(), 2);
    assert_eq!(store.snapshot().transport_state, TransportState::Playing);
    assert!(station.is_playing());
}

#[tokio::test]
async fn independent_radio_follows_ticks() {
    let engine = ScriptedEngine::new();
    let station = RadioStation::independent(engine.clone());
    let stream = live_stream();

    assert!(station.toggle(stream.clone()).await.is_applied());
    let handle = engine.handle_for(&stream.audio_url).unwrap();

    engine.tick(handle, PlaybackStatus::paused(0, 0));
    settle().await;
    assert!(!station.is_playing());

    engine.tick(handle, PlaybackStatus::playing(1_000, 0));
    settle().await;
    assert!(station.is_playing());
}

#[tokio::test]
async fn independent_radio_stream_failure_releases_resource() {
    let engine = ScriptedEngine::new();
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let station = RadioStation::independent(engine.clone()).with_event_bus(bus);
    let stream = live_stream();

    assert!(station.toggle(stream.clone()).await.is_applied());
    let handle = engine.handle_for(&stream.audio_url).unwrap();
    engine.emit(
        handle,
        EngineStatus::Failed {
            message: "stream ended".into(),
        },
    );
    settle().await;

    let snapshot = station.snapshot();
    assert!(!snapshot.is_playing);
    assert!(matches!(
        snapshot.last_error,
        Some(PlaybackError::StreamFailed(_))
    ));
    assert!(!engine.is_live(handle));

    let mut saw_error = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, CoreEvent::Radio(RadioEvent::Error { .. })) {
            saw_error = true;
        }
    }
    assert!(saw_error);

    // Next press reconnects.
    assert!(station.toggle(stream.clone()).await.is_applied());
    assert_eq!(engine.load_count(&stream.audio_url), 2);
}

#[tokio::test]
async fn independent_stop_during_connect_supersedes_it() {
    let engine = ScriptedEngine::new();
    let station = RadioStation::independent(engine.clone());
    let stream = live_stream();
    engine.gate(&stream.audio_url);

    let connecting = {
        let station = station.clone();
        let stream = stream.clone();
        tokio::spawn(async move { station.toggle(stream).await })
    };
    engine.wait_for_load(&stream.audio_url, 1).await;
    assert!(station.snapshot().is_loading);

    assert!(station.stop().await.is_applied());
    engine.release(&stream.audio_url);

    let outcome = tokio::time::timeout(Duration::from_secs(1), connecting)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Superseded);
    assert_eq!(engine.live_count(), 0);
    assert!(station.snapshot().stream.is_none());
}

#[tokio::test]
async fn independent_stop_publishes_stopped_not_paused() {
    let engine = ScriptedEngine::new();
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let station = RadioStation::independent(engine.clone()).with_event_bus(bus);
    let stream = live_stream();

    assert!(station.toggle(stream.clone()).await.is_applied());
    assert!(station.stop().await.is_applied());

    let mut radio_events = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Radio(event) = event {
            radio_events.push(event);
        }
    }
    assert_eq!(
        radio_events.last(),
        Some(&RadioEvent::Stopped {
            stream_id: stream.id.clone()
        })
    );
    assert!(!radio_events
        .iter()
        .any(|e| matches!(e, RadioEvent::Paused { .. })));
    assert_eq!(engine.live_count(), 0);
}

#[tokio::test]
async fn shared_radio_replaces_the_sermon() {
    let engine = ScriptedEngine::new();
    let store = SessionStore::new(engine.clone());
    let station = RadioStation::shared(store.clone());
    assert_eq!(station.policy(), RadioPolicy::SharedSession);

    assert!(store.play_item(sermon("s1")).await.is_applied());
    assert!(station.toggle(live_stream()).await.is_applied());

    assert_eq!(engine.live_count(), 1);
    assert_eq!(store.snapshot().current_item_id(), Some("radio-1"));
    assert!(station.is_playing());

    assert!(station.toggle(live_stream()).await.is_applied());
    assert!(!station.is_playing());
    assert_eq!(store.snapshot().transport_state, TransportState::Paused);
}

#[tokio::test]
async fn shared_radio_stop_leaves_other_items_alone() {
    let engine = ScriptedEngine::new();
    let store = SessionStore::new(engine.clone());
    let station = RadioStation::shared(store.clone());

    assert!(station.toggle(live_stream()).await.is_applied());
    assert!(store.play_item(sermon("s1")).await.is_applied());

    assert_eq!(station.stop().await, ActionOutcome::NoOp);
    assert_eq!(store.snapshot().current_item_id(), Some("s1"));
    assert!(!station.is_playing());
}
