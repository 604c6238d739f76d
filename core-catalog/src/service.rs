//! # Catalogue Service
//!
//! Screen-facing catalogue queries. Failures never reach the caller: they are
//! logged, published as [`CatalogEvent::FetchFailed`], and replaced by an
//! empty result, or by demo content when placeholders are enabled.

use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::fallback;
use crate::models::{Category, HomeFeed, RadioStream, SermonDetail, SermonSummary};
use crate::source::CatalogSource;

pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
    placeholders: bool,
    events: Option<EventBus>,
}

impl CatalogService {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            placeholders: false,
            events: None,
        }
    }

    /// Serve demo content instead of empty results.
    pub fn with_placeholders(mut self, enabled: bool) -> Self {
        self.placeholders = enabled;
        self
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    fn publish(&self, event: CatalogEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.emit(CoreEvent::Catalog(event));
        }
    }

    fn report_failure(&self, query: &str, error: &dyn std::error::Error) {
        warn!(query, error = %error, "Catalogue query failed");
        self.publish(CatalogEvent::FetchFailed {
            query: query.to_string(),
            message: error.to_string(),
        });
    }

    /// Apply the fallback policy to a list query.
    fn settle<T>(
        &self,
        query: &str,
        result: Result<Vec<T>>,
        placeholder: impl FnOnce() -> Vec<T>,
    ) -> Vec<T> {
        let (items, failed) = match result {
            Ok(items) => (items, false),
            Err(e) => {
                self.report_failure(query, &e);
                (Vec::new(), true)
            }
        };

        if !items.is_empty() {
            return items;
        }
        if self.placeholders {
            debug!(query, "Serving placeholder content");
            self.publish(CatalogEvent::FallbackServed {
                query: query.to_string(),
                placeholder: true,
            });
            return placeholder();
        }
        if failed {
            self.publish(CatalogEvent::FallbackServed {
                query: query.to_string(),
                placeholder: false,
            });
        }
        items
    }

    /// Categories sorted by name.
    pub async fn get_categories(&self) -> Vec<Category> {
        let result = self.source.get_categories().await.map(|mut categories| {
            categories.sort_by_cached_key(|c| c.name.to_lowercase());
            categories
        });
        self.settle("categories", result, fallback::categories)
    }

    /// Category name lookup. `None` when unknown or unreachable.
    pub async fn get_category(&self, id: &str) -> Option<Category> {
        match self.source.get_category(id).await {
            Ok(category) => Some(category),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                self.report_failure("category", &e);
                None
            }
        }
    }

    /// Sermons of a category, newest first.
    pub async fn get_sermons_by_category(&self, category_id: &str) -> Vec<SermonSummary> {
        let result = self
            .source
            .get_sermons_by_category(category_id)
            .await
            .map(newest_first);
        self.settle("sermons_by_category", result, fallback::category_sermons)
    }

    pub async fn get_featured_sermons(&self) -> Vec<SermonSummary> {
        let result = self.source.get_featured_sermons().await.map(newest_first);
        self.settle("featured_sermons", result, fallback::home_sermons)
    }

    pub async fn get_recent_sermons(&self) -> Vec<SermonSummary> {
        let result = self.source.get_recent_sermons().await.map(newest_first);
        self.settle("recent_sermons", result, fallback::home_sermons)
    }

    /// `None` when the sermon does not exist (demo detail with placeholders on).
    pub async fn get_sermon_detail(&self, id: &str) -> Option<SermonDetail> {
        match self.source.get_sermon_detail(id).await {
            Ok(detail) => return Some(detail),
            Err(e) if e.is_not_found() => debug!(id, "Sermon not found"),
            Err(e) => self.report_failure("sermon_detail", &e),
        }

        if !self.placeholders {
            return None;
        }
        self.publish(CatalogEvent::FallbackServed {
            query: "sermon_detail".to_string(),
            placeholder: true,
        });
        Some(fallback::sermon_detail())
    }

    /// Active streams only.
    pub async fn get_active_radio_streams(&self) -> Vec<RadioStream> {
        let result = self
            .source
            .get_active_radio_streams()
            .await
            .map(|streams| streams.into_iter().filter(|s| s.is_active).collect());
        self.settle("radio_streams", result, fallback::radio_streams)
    }

    /// Home screen data, fetched concurrently.
    pub async fn get_home_feed(&self) -> HomeFeed {
        let (categories, featured, recent) = tokio::join!(
            self.get_categories(),
            self.get_featured_sermons(),
            self.get_recent_sermons()
        );
        HomeFeed {
            categories,
            featured,
            recent,
        }
    }
}

fn newest_first(mut sermons: Vec<SermonSummary>) -> Vec<SermonSummary> {
    sermons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sermons
}
