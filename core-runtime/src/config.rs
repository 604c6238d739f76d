//! # Core Configuration Module
//!
//! Configuration management for the sermon player core.
//!
//! ## Overview
//!
//! [`AppConfig`] holds every dependency and setting the core needs. It is
//! built through [`AppConfigBuilder`], which validates eagerly and fails fast
//! with actionable messages when a required bridge is missing.
//!
//! ## Required Dependencies
//!
//! - `PlaybackEngine` - the host audio engine backing the shared session
//! - `CatalogApiConfig` - Supabase project URL and anonymous key
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - catalogue transport (desktop default: reqwest)
//! - `radio_engine` - dedicated engine for the live radio slot
//! - `Clock` - time source (default: system clock)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{AppConfig, CatalogApiConfig};
//! use std::sync::Arc;
//!
//! let config = AppConfig::builder()
//!     .catalog(CatalogApiConfig::from_env()?)
//!     .playback_engine(Arc::new(MyEngine::new()))
//!     .enable_placeholder_content(true)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use crate::logging::redact_if_sensitive;
use bridge_traits::{Clock, HttpClient, PlaybackEngine, SystemClock};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Environment variable holding the Supabase project URL.
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
/// Environment variable holding the Supabase anonymous key.
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";

const LEGACY_ENV_PREFIX: &str = "EXPO_PUBLIC_";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for the catalogue backend (Supabase/PostgREST).
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogApiConfig {
    /// Project base URL, e.g. `https://abcd.supabase.co`
    pub base_url: String,
    /// Public anonymous key, sent as `apikey` and bearer token
    pub anon_key: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl CatalogApiConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load from `SUPABASE_URL` / `SUPABASE_ANON_KEY`.
    ///
    /// The `EXPO_PUBLIC_`-prefixed names used by the mobile app are accepted
    /// as a fallback.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .or_else(|| lookup(&format!("{}{}", LEGACY_ENV_PREFIX, key)))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let base_url = read(ENV_SUPABASE_URL).ok_or_else(|| {
            Error::Config(format!(
                "Missing catalogue URL. Set {} to your Supabase project URL.",
                ENV_SUPABASE_URL
            ))
        })?;
        let anon_key = read(ENV_SUPABASE_ANON_KEY).ok_or_else(|| {
            Error::Config(format!(
                "Missing catalogue key. Set {} to your Supabase anonymous key.",
                ENV_SUPABASE_ANON_KEY
            ))
        })?;

        let config = Self::new(base_url, anon_key);
        config.validate()?;
        Ok(config)
    }

    /// Parsed base URL.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(self.base_url.trim()).map_err(|e| Error::InvalidUrl {
            field: "catalog.base_url".to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::InvalidUrl {
                field: "catalog.base_url".to_string(),
                reason: format!("unsupported scheme '{}', expected http or https", other),
            }),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;

        if self.anon_key.trim().is_empty() {
            return Err(Error::Config(
                "Catalogue anonymous key cannot be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Catalogue request timeout must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(format!(
                "Catalogue request timeout exceeds maximum of {} seconds",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for CatalogApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogApiConfig")
            .field("base_url", &self.base_url)
            .field("anon_key", &redact_if_sensitive("anon_key", &self.anon_key))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Feature flags control optional functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Serve demo categories/sermons/radio when the catalogue is unreachable
    pub enable_placeholder_content: bool,

    /// Publish `CoreEvent`s on the shared event bus
    pub enable_event_bus: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_placeholder_content: false,
            enable_event_bus: true,
        }
    }
}

/// Application configuration.
///
/// Use [`AppConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct AppConfig {
    pub catalog: CatalogApiConfig,

    /// HTTP client for catalogue requests (desktop default when `None`)
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Engine backing the shared playback session (required)
    pub playback_engine: Arc<dyn PlaybackEngine>,

    /// Engine for the independent radio slot; falls back to `playback_engine`
    pub radio_engine: Option<Arc<dyn PlaybackEngine>>,

    pub clock: Arc<dyn Clock>,

    /// Broadcast buffer per event subscriber
    pub event_buffer_size: usize,

    pub features: FeatureFlags,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("catalog", &self.catalog)
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("playback_engine", &"PlaybackEngine { ... }")
            .field(
                "radio_engine",
                &self.radio_engine.as_ref().map(|_| "PlaybackEngine { ... }"),
            )
            .field("event_buffer_size", &self.event_buffer_size)
            .field("features", &self.features)
            .finish()
    }
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > 10_000 {
            return Err(Error::Config(
                "Event buffer size exceeds maximum of 10,000 events".to_string(),
            ));
        }

        Ok(())
    }

    /// Engine used by the radio slot.
    pub fn radio_engine(&self) -> Arc<dyn PlaybackEngine> {
        self.radio_engine
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.playback_engine))
    }
}

fn playback_engine_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "PlaybackEngine".to_string(),
        message: "A PlaybackEngine implementation is required to play sermons. \
                 iOS: wrap AVPlayer. Android: wrap ExoPlayer/Media3. \
                 Desktop: wrap your decoder of choice behind bridge_traits::PlaybackEngine."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(catalog: &CatalogApiConfig) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::with_timeout(catalog.request_timeout));
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_catalog: &CatalogApiConfig) -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "An HttpClient implementation is required for catalogue requests. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Mobile: inject the platform's native HTTP stack."
            .to_string(),
    })
}

/// Builder for [`AppConfig`].
#[derive(Default)]
pub struct AppConfigBuilder {
    catalog: Option<CatalogApiConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    playback_engine: Option<Arc<dyn PlaybackEngine>>,
    radio_engine: Option<Arc<dyn PlaybackEngine>>,
    clock: Option<Arc<dyn Clock>>,
    event_buffer_size: Option<usize>,
    features: FeatureFlags,
}

impl AppConfigBuilder {
    /// Sets the catalogue connection settings (required).
    pub fn catalog(mut self, catalog: CatalogApiConfig) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the engine backing the shared playback session (required).
    pub fn playback_engine(mut self, engine: Arc<dyn PlaybackEngine>) -> Self {
        self.playback_engine = Some(engine);
        self
    }

    /// Sets a dedicated engine for the live radio slot.
    pub fn radio_engine(mut self, engine: Arc<dyn PlaybackEngine>) -> Self {
        self.radio_engine = Some(engine);
        self
    }

    /// Overrides the time source (tests use a manual clock).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Default: 100 events.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Default: false
    pub fn enable_placeholder_content(mut self, enabled: bool) -> Self {
        self.features.enable_placeholder_content = enabled;
        self
    }

    /// Default: true
    pub fn enable_event_bus(mut self, enabled: bool) -> Self {
        self.features.enable_event_bus = enabled;
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Builds the final [`AppConfig`].
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when the catalogue settings are missing or invalid
    /// - [`Error::CapabilityMissing`] when no `PlaybackEngine` was provided, or
    ///   no `HttpClient` is available for this platform
    pub fn build(self) -> Result<AppConfig> {
        let catalog = self.catalog.ok_or_else(|| {
            Error::Config(
                "Catalogue configuration is required. Use .catalog() or CatalogApiConfig::from_env()."
                    .to_string(),
            )
        })?;

        let playback_engine = self
            .playback_engine
            .ok_or_else(playback_engine_missing_error)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(&catalog)?,
        };

        let config = AppConfig {
            catalog,
            http_client: Some(http_client),
            playback_engine,
            radio_engine: self.radio_engine,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            features: self.features,
        };

        config.validate()?;

        Ok(config)
    }
}
