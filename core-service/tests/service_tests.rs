//! Wiring of the core service façade.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    status_channel, AudioMode, EngineHandle, HttpClient, HttpRequest, HttpResponse, LoadRequest,
    LoadedSound, PlaybackEngine,
};
use core_catalog::SermonSummary;
use core_playback::{RadioPolicy, SessionConfig, TransportState};
use core_runtime::config::{AppConfig, CatalogApiConfig};
use core_runtime::events::{CoreEvent, PlaybackEvent};
use core_service::CoreService;
use mockall::mock;
use std::sync::Arc;

mock! {
    Engine {}

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

mock! {
    Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

fn engine() -> MockEngine {
    let mut engine = MockEngine::new();
    engine.expect_configure_audio_mode().returning(|_| Ok(()));
    engine.expect_load().returning(|_| {
        let (_tx, rx) = status_channel();
        Ok(LoadedSound::new(EngineHandle::new(), rx))
    });
    engine.expect_stop().returning(|_| Ok(()));
    engine.expect_unload().returning(|_| Ok(()));
    engine
}

fn config(engine: MockEngine, http: MockHttp, placeholders: bool) -> AppConfig {
    AppConfig::builder()
        .catalog(CatalogApiConfig::new("https://demo.supabase.co", "anon-key"))
        .playback_engine(Arc::new(engine))
        .http_client(Arc::new(http))
        .enable_placeholder_content(placeholders)
        .build()
        .unwrap()
}

#[tokio::test]
async fn bootstrap_plays_catalogue_items_through_the_session() {
    let mut http = MockHttp::new();
    http.expect_execute().returning(|req| {
        assert!(req.url.starts_with("https://demo.supabase.co/rest/v1/sermons"));
        Ok(HttpResponse::new(
            200,
            r#"[{"id":"s1","title":"La foi","preacher":"Pasteur Marie","audio_url":"https://cdn/s1.mp3","image_url":null}]"#,
        ))
    });

    let service = CoreService::bootstrap(config(engine(), http, false), SessionConfig::default())
        .await
        .unwrap();
    let mut events = service.subscribe_events().expect("event bus enabled");

    let featured: Vec<SermonSummary> = service.catalog().get_featured_sermons().await;
    assert_eq!(featured.len(), 1);

    let outcome = service.session().play_item(featured[0].to_playable()).await;
    assert!(outcome.is_applied());
    assert_eq!(
        service.session().snapshot().transport_state,
        TransportState::Playing
    );

    assert!(matches!(
        events.recv().await,
        Ok(CoreEvent::Playback(PlaybackEvent::Loading { .. }))
    ));

    service.shutdown().await;
    assert_eq!(service.session().snapshot().transport_state, TransportState::Idle);
}

#[tokio::test]
async fn placeholder_radio_stream_when_catalogue_is_down() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .returning(|_| Ok(HttpResponse::new(503, "unavailable")));

    let service = CoreService::new(config(engine(), http, true), SessionConfig::default()).unwrap();

    let streams = service.catalog().get_active_radio_streams().await;
    assert_eq!(streams.len(), 1);
    assert_eq!(service.radio().policy(), RadioPolicy::Independent);

    assert!(service.radio().toggle(streams[0].to_playable()).await.is_applied());
    assert!(service.radio().is_playing());
    assert!(service.session().snapshot().current_item.is_none());
}

#[tokio::test]
async fn shutdown_releases_session_and_radio_when_engine_rejects_teardown() {
    let mut engine = MockEngine::new();
    engine.expect_configure_audio_mode().returning(|_| Ok(()));
    engine.expect_load().returning(|_| {
        let (_tx, rx) = status_channel();
        Ok(LoadedSound::new(EngineHandle::new(), rx))
    });
    engine
        .expect_stop()
        .times(2)
        .returning(|_| Err(BridgeError::OperationFailed("device gone".into())));
    engine
        .expect_unload()
        .times(2)
        .returning(|_| Err(BridgeError::OperationFailed("device gone".into())));

    let service = CoreService::new(
        config(engine, MockHttp::new(), true),
        SessionConfig::default(),
    )
    .unwrap();

    let sermon = core_catalog::fallback::sermon_detail().to_playable();
    let stream = core_catalog::fallback::radio_streams()[0].to_playable();
    assert!(service.session().play_item(sermon).await.is_applied());
    assert!(service.radio().toggle(stream).await.is_applied());

    service.shutdown().await;

    let snapshot = service.session().snapshot();
    assert_eq!(snapshot.transport_state, TransportState::Idle);
    assert!(snapshot.current_item.is_none());
    assert!(!service.session().has_active_resource());
    assert!(service.radio().snapshot().stream.is_none());
}

#[tokio::test]
async fn shared_radio_policy_uses_the_session() {
    let service = CoreService::new(
        config(engine(), MockHttp::new(), false),
        SessionConfig::default().with_radio_policy(RadioPolicy::SharedSession),
    )
    .unwrap();

    assert_eq!(service.radio().policy(), RadioPolicy::SharedSession);
}

#[test]
fn disabled_event_bus_has_no_stream() {
    let config = AppConfig::builder()
        .catalog(CatalogApiConfig::new("https://demo.supabase.co", "anon-key"))
        .playback_engine(Arc::new(MockEngine::new()))
        .http_client(Arc::new(MockHttp::new()))
        .enable_event_bus(false)
        .build()
        .unwrap();

    let service = CoreService::new(config, SessionConfig::default()).unwrap();
    assert!(service.subscribe_events().is_none());
}
