//! Catalogue backends.
//!
//! [`CatalogSource`] is the raw, fallible query interface. [`SupabaseCatalog`]
//! implements it against the PostgREST endpoint of a Supabase project.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::CatalogApiConfig;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{CatalogError, Result};
use crate::models::{Category, RadioStream, SermonDetail, SermonSummary};

/// Sermons in the home screen carousel.
pub const FEATURED_LIMIT: usize = 5;

/// First row of the "recent" list, right after the featured ones.
pub const RECENT_OFFSET: usize = 5;

/// Rows in the "recent" list (rows 5 through 10).
pub const RECENT_LIMIT: usize = 6;

const SUMMARY_COLUMNS: &str = "id,title,preacher,audio_url,image_url,created_at";
const DETAIL_COLUMNS: &str = "id,title,preacher,description,audio_url,image_url,duration,category_id";
const NEWEST_FIRST: &str = "created_at.desc";

/// Read-only catalogue queries. Errors are returned as-is; see
/// [`CatalogService`](crate::service::CatalogService) for the fallback policy.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// All categories, ordered by name.
    async fn get_categories(&self) -> Result<Vec<Category>>;

    async fn get_category(&self, id: &str) -> Result<Category>;

    /// Sermons of one category, newest first.
    async fn get_sermons_by_category(&self, category_id: &str) -> Result<Vec<SermonSummary>>;

    /// The [`FEATURED_LIMIT`] newest sermons.
    async fn get_featured_sermons(&self) -> Result<Vec<SermonSummary>>;

    /// The sermons following the featured ones.
    async fn get_recent_sermons(&self) -> Result<Vec<SermonSummary>>;

    async fn get_sermon_detail(&self, id: &str) -> Result<SermonDetail>;

    async fn get_active_radio_streams(&self) -> Result<Vec<RadioStream>>;
}

/// PostgREST connector
///
/// # Example
///
/// ```ignore
/// let config = CatalogApiConfig::from_env()?;
/// let catalog = SupabaseCatalog::new(http_client, &config)?;
/// let categories = catalog.get_categories().await?;
/// ```
pub struct SupabaseCatalog {
    http_client: Arc<dyn HttpClient>,
    rest_base: Url,
    anon_key: String,
    request_timeout: Duration,
}

impl SupabaseCatalog {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &CatalogApiConfig) -> Result<Self> {
        config.validate()?;

        let mut base = config.parsed_base_url()?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_base = base
            .join("rest/v1/")
            .map_err(|e| CatalogError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            rest_base,
            anon_key: config.anon_key.clone(),
            request_timeout: config.request_timeout,
        })
    }

    /// Build `<base>/rest/v1/<table>?<params>`.
    fn table_url(&self, table: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .rest_base
            .join(table)
            .map_err(|e| CatalogError::Config(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let request = HttpRequest::get(url.as_str())
            .header("apikey", self.anon_key.as_str())
            .bearer_token(self.anon_key.as_str())
            .header("Accept", "application/json")
            .timeout(self.request_timeout);

        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let message = response.text().unwrap_or_default();
            warn!(status = response.status, "Catalogue request rejected");
            return Err(CatalogError::Fetch {
                status: response.status,
                message: message.trim().to_string(),
            });
        }

        response
            .json()
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: &str,
        entity: &'static str,
        id: &str,
        columns: &str,
    ) -> Result<T> {
        let filter = format!("eq.{}", id);
        let url = self.table_url(
            table,
            &[("select", columns), ("id", filter.as_str()), ("limit", "1")],
        )?;
        let rows: Vec<T> = self.fetch(url).await?;
        rows.into_iter().next().ok_or_else(|| CatalogError::NotFound {
            entity,
            id: id.to_string(),
        })
    }
}

#[async_trait]
impl CatalogSource for SupabaseCatalog {
    async fn get_categories(&self) -> Result<Vec<Category>> {
        let url = self.table_url("categories", &[("select", "*"), ("order", "name.asc")])?;
        let categories: Vec<Category> = self.fetch(url).await?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    async fn get_category(&self, id: &str) -> Result<Category> {
        self.fetch_one("categories", "Category", id, "id,name")
            .await
    }

    async fn get_sermons_by_category(&self, category_id: &str) -> Result<Vec<SermonSummary>> {
        let filter = format!("eq.{}", category_id);
        let url = self.table_url(
            "sermons",
            &[
                ("select", SUMMARY_COLUMNS),
                ("category_id", filter.as_str()),
                ("order", NEWEST_FIRST),
            ],
        )?;
        self.fetch(url).await
    }

    async fn get_featured_sermons(&self) -> Result<Vec<SermonSummary>> {
        let limit = FEATURED_LIMIT.to_string();
        let url = self.table_url(
            "sermons",
            &[
                ("select", SUMMARY_COLUMNS),
                ("order", NEWEST_FIRST),
                ("limit", limit.as_str()),
            ],
        )?;
        self.fetch(url).await
    }

    async fn get_recent_sermons(&self) -> Result<Vec<SermonSummary>> {
        let limit = RECENT_LIMIT.to_string();
        let offset = RECENT_OFFSET.to_string();
        let url = self.table_url(
            "sermons",
            &[
                ("select", SUMMARY_COLUMNS),
                ("order", NEWEST_FIRST),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ],
        )?;
        self.fetch(url).await
    }

    async fn get_sermon_detail(&self, id: &str) -> Result<SermonDetail> {
        self.fetch_one("sermons", "Sermon", id, DETAIL_COLUMNS).await
    }

    async fn get_active_radio_streams(&self) -> Result<Vec<RadioStream>> {
        let url = self.table_url(
            "radio_streams",
            &[("select", "*"), ("is_active", "eq.true")],
        )?;
        self.fetch(url).await
    }
}
