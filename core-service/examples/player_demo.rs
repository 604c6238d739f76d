//! End-to-end demo with a simulated engine and placeholder catalogue content.
//!
//! Run with:
//! ```bash
//! cargo run -p core-service --example player_demo
//!
//! # JSON logs
//! cargo run -p core-service --example player_demo -- json
//! ```

use anyhow::Context;
use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::time::LogLevel;
use bridge_traits::{
    status_channel, EngineHandle, EngineStatus, HttpClient, HttpRequest, HttpResponse,
    LoadRequest, LoadedSound, PlaybackEngine, PlaybackStatus, StatusSender,
};
use core_playback::{MiniPlayerView, SessionConfig};
use core_runtime::config::{AppConfig, CatalogApiConfig};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::CoreService;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

const TICK_MS: u64 = 250;
const DEMO_DURATION_MS: u64 = 30_000;

struct Voice {
    status: StatusSender,
    playing: bool,
    position_ms: u64,
}

/// Pretends to play: advances a position counter and reports it every tick.
#[derive(Default)]
struct SimulatedEngine {
    voices: Arc<Mutex<HashMap<EngineHandle, Voice>>>,
}

impl SimulatedEngine {
    fn with_voice<T>(
        &self,
        handle: EngineHandle,
        f: impl FnOnce(&mut Voice) -> T,
    ) -> BridgeResult<T> {
        let mut voices = self
            .voices
            .lock()
            .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;
        voices
            .get_mut(&handle)
            .map(f)
            .ok_or_else(|| BridgeError::stale(handle))
    }
}

#[async_trait]
impl PlaybackEngine for SimulatedEngine {
    async fn load(&self, request: LoadRequest) -> BridgeResult<LoadedSound> {
        let handle = EngineHandle::new();
        let (tx, rx) = status_channel();
        self.voices
            .lock()
            .map_err(|e| BridgeError::OperationFailed(e.to_string()))?
            .insert(
                handle,
                Voice {
                    status: tx,
                    playing: request.autoplay,
                    position_ms: 0,
                },
            );

        let voices = Arc::clone(&self.voices);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
            loop {
                interval.tick().await;
                let Ok(mut voices) = voices.lock() else { break };
                let Some(voice) = voices.get_mut(&handle) else { break };
                if voice.playing {
                    voice.position_ms = (voice.position_ms + TICK_MS).min(DEMO_DURATION_MS);
                }
                let status = if voice.playing {
                    PlaybackStatus::playing(voice.position_ms, DEMO_DURATION_MS)
                } else {
                    PlaybackStatus::paused(voice.position_ms, DEMO_DURATION_MS)
                };
                let _ = voice.status.send(EngineStatus::Update(status));
            }
        });

        Ok(LoadedSound::new(handle, rx))
    }

    async fn play(&self, handle: EngineHandle) -> BridgeResult<()> {
        self.with_voice(handle, |v| v.playing = true)
    }

    async fn pause(&self, handle: EngineHandle) -> BridgeResult<()> {
        self.with_voice(handle, |v| v.playing = false)
    }

    async fn stop(&self, handle: EngineHandle) -> BridgeResult<()> {
        self.with_voice(handle, |v| {
            v.playing = false;
            v.position_ms = 0;
        })
    }

    async fn seek(&self, handle: EngineHandle, position_ms: u64) -> BridgeResult<()> {
        self.with_voice(handle, |v| v.position_ms = position_ms)
    }

    async fn set_volume(&self, handle: EngineHandle, _volume: f32) -> BridgeResult<()> {
        self.with_voice(handle, |_| ())
    }

    async fn set_muted(&self, handle: EngineHandle, _muted: bool) -> BridgeResult<()> {
        self.with_voice(handle, |_| ())
    }

    async fn unload(&self, handle: EngineHandle) -> BridgeResult<()> {
        self.voices
            .lock()
            .map_err(|e| BridgeError::OperationFailed(e.to_string()))?
            .remove(&handle);
        Ok(())
    }
}

/// Catalogue that is always offline, so placeholder content is served.
struct OfflineHttp;

#[async_trait]
impl HttpClient for OfflineHttp {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        Err(BridgeError::NotAvailable("demo runs offline".to_string()))
    }
}

fn print_player(service: &CoreService) {
    match MiniPlayerView::project(&service.session().snapshot()) {
        Some(view) => info!(
            title = %view.title,
            state = ?view.transport_state,
            position = %view.position_label,
            duration = %view.duration_label,
            "Mini-player"
        ),
        None => info!("Mini-player hidden"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = match std::env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };
    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug),
    )
    .context("initializing logging")?;

    let config = AppConfig::builder()
        .catalog(CatalogApiConfig::new("https://demo.supabase.co", "demo-anon-key"))
        .playback_engine(Arc::new(SimulatedEngine::default()))
        .http_client(Arc::new(OfflineHttp))
        .enable_placeholder_content(true)
        .build()
        .context("building configuration")?;

    let service = CoreService::bootstrap(config, SessionConfig::default())
        .await
        .context("bootstrapping core service")?;

    let feed = service.catalog().get_home_feed().await;
    info!(
        categories = feed.categories.len(),
        featured = feed.featured.len(),
        "Home feed loaded"
    );

    let first = feed
        .featured
        .first()
        .context("no featured sermon available")?
        .to_playable();
    let _ = service.session().play_item(first).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    print_player(&service);

    let _ = service.session().toggle_play_pause().await;
    tokio::time::sleep(Duration::from_millis(600)).await;
    print_player(&service);

    let _ = core_playback::seek_to_fraction(service.session(), 0.5).await;
    let _ = service.session().toggle_play_pause().await;
    let _ = service.session().set_minimized(true);
    tokio::time::sleep(Duration::from_secs(1)).await;
    print_player(&service);

    if let Some(stream) = service.catalog().get_active_radio_streams().await.first() {
        let _ = service.radio().toggle(stream.to_playable()).await;
        info!(playing = service.radio().is_playing(), "Radio toggled");
    }

    service.shutdown().await;
    print_player(&service);
    Ok(())
}
