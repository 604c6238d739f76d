//! # Catalogue Module
//!
//! Read-only access to categories, sermons and live radio streams.
//!
//! ## Overview
//!
//! - [`CatalogSource`]: raw queries, implemented by [`SupabaseCatalog`] over
//!   the host `HttpClient`
//! - [`CatalogService`]: what screens call; never fails, falls back to empty
//!   or demo content
//! - Records convert into [`core_playback::PlayableItem`] for the player

pub mod error;
pub mod fallback;
pub mod models;
pub mod service;
pub mod source;

pub use error::{CatalogError, Result};
pub use models::{Category, HomeFeed, RadioStream, SermonDetail, SermonSummary};
pub use service::CatalogService;
pub use source::{CatalogSource, SupabaseCatalog};
