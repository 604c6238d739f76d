//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux) and for integration tests.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with retry and exponential backoff
//!
//! Playback engines are always host-provided; desktop hosts wire their own
//! decoder behind `bridge_traits::PlaybackEngine`.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use bridge_desktop::ReqwestHttpClient;
//! use bridge_traits::HttpClient;
//!
//! let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
//! // Hand it to core_runtime::config::AppConfig::builder().http_client(...)
//! ```

mod http;

pub use http::ReqwestHttpClient;
