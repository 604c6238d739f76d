//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (playback engine,
//! HTTP) and configuration into one constructed [`CoreService`]: the shared
//! playback session, the radio slot, the catalogue and the event bus. Hosts
//! create it once at start-up and hand clones to every screen.
//!
//! Desktop hosts typically enable the `desktop-shims` feature so the
//! catalogue gets a reqwest-based `HttpClient` without extra wiring.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::PlaybackEngine;
use core_catalog::{CatalogService, SupabaseCatalog};
use core_playback::{RadioPolicy, RadioStation, SessionConfig, SessionStore};
use core_runtime::config::{AppConfig, CatalogApiConfig};
use core_runtime::events::{EventBus, EventStream};
use tracing::{info, warn};

struct ServiceInner {
    config: AppConfig,
    events: Option<EventBus>,
    session: SessionStore,
    radio: RadioStation,
    catalog: CatalogService,
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<ServiceInner>,
}

impl CoreService {
    /// Wire the service from validated configuration.
    ///
    /// Does not touch the engine; call [`CoreService::bootstrap`] to also
    /// apply the audio mode.
    pub fn new(config: AppConfig, session_config: SessionConfig) -> Result<Self> {
        let events = config
            .features
            .enable_event_bus
            .then(|| EventBus::new(config.event_buffer_size));

        let http_client = config
            .http_client
            .clone()
            .ok_or_else(|| CoreError::CapabilityMissing {
                capability: "HttpClient".to_string(),
                message: "AppConfig was built without an HTTP client".to_string(),
            })?;

        let mut store = SessionStore::builder(Arc::clone(&config.playback_engine))
            .config(session_config.clone())
            .clock(Arc::clone(&config.clock));
        if let Some(bus) = &events {
            store = store.event_bus(bus.clone());
        }
        let session = store.build()?;

        let radio = match session_config.radio_policy {
            RadioPolicy::Independent => {
                let station = RadioStation::independent(config.radio_engine());
                match &events {
                    Some(bus) => station.with_event_bus(bus.clone()),
                    None => station,
                }
            }
            RadioPolicy::SharedSession => RadioStation::shared(session.clone()),
        };

        let source = SupabaseCatalog::new(http_client, &config.catalog)?;
        let mut catalog = CatalogService::new(Arc::new(source))
            .with_placeholders(config.features.enable_placeholder_content);
        if let Some(bus) = &events {
            catalog = catalog.with_event_bus(bus.clone());
        }

        info!(
            radio_policy = ?session_config.radio_policy,
            event_bus = events.is_some(),
            "Core service initialized"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                config,
                events,
                session,
                radio,
                catalog,
            }),
        })
    }

    /// Construct the service and configure the audio session.
    pub async fn bootstrap(config: AppConfig, session_config: SessionConfig) -> Result<Self> {
        let service = Self::new(config, session_config)?;
        if let Some(err) = service.inner.session.initialize().await.error() {
            warn!(error = %err, "Continuing with the engine's default audio mode");
        }
        Ok(service)
    }

    /// Bootstrap with catalogue settings read from the environment.
    pub async fn bootstrap_from_env(engine: Arc<dyn PlaybackEngine>) -> Result<Self> {
        let config = AppConfig::builder()
            .catalog(CatalogApiConfig::from_env()?)
            .playback_engine(engine)
            .build()?;
        Self::bootstrap(config, SessionConfig::default()).await
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// The shared playback session.
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn radio(&self) -> &RadioStation {
        &self.inner.radio
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// `None` when the event bus is disabled.
    pub fn subscribe_events(&self) -> Option<EventStream> {
        self.inner
            .events
            .as_ref()
            .map(|bus| EventStream::new(bus.subscribe()))
    }

    /// Release every engine resource. Call before the host exits.
    pub async fn shutdown(&self) {
        if let Some(err) = self.inner.radio.stop().await.error() {
            warn!(error = %err, "Radio did not stop cleanly");
        }
        if let Some(err) = self.inner.session.shutdown().await.error() {
            warn!(error = %err, "Playback session did not stop cleanly");
        }
        info!("Core service shut down");
    }
}
