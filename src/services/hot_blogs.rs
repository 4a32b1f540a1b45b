//! Hot blog rankings
//!
//! Blogs ranked by their reads over the trailing 7 or 30 days, today
//! excluded. The 7-day list is also served cache-aside: the first request
//! after expiry recomputes it while concurrent requests wait for that
//! result instead of recomputing it themselves.

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::ReadStatsRepository;
use crate::models::HotBlog;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Number of blogs in every hot list
pub const HOT_BLOGS_LIMIT: i64 = 7;

/// Cache key of the 7-day hot list
pub const HOT_BLOGS_FOR_7_DAYS_KEY: &str = "hot_blogs_for_7_days";

/// Lifetime of the cached 7-day hot list (1 hour)
pub const HOT_BLOGS_CACHE_TTL_SECS: u64 = 3600;

pub struct HotBlogService {
    repo: Arc<dyn ReadStatsRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
    /// Held while the cached 7-day list is recomputed
    refresh: Mutex<()>,
}

impl HotBlogService {
    pub fn new(repo: Arc<dyn ReadStatsRepository>, cache: Arc<Cache>) -> Self {
        Self::with_cache_ttl(repo, cache, Duration::from_secs(HOT_BLOGS_CACHE_TTL_SECS))
    }

    pub fn with_cache_ttl(
        repo: Arc<dyn ReadStatsRepository>,
        cache: Arc<Cache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            cache,
            cache_ttl,
            refresh: Mutex::new(()),
        }
    }

    /// Top blogs of the 7 days before today (UTC)
    pub async fn get_7_days_hot_blogs(&self) -> Result<Vec<HotBlog>> {
        self.get_7_days_hot_blogs_on(today()).await
    }

    pub async fn get_7_days_hot_blogs_on(&self, today: NaiveDate) -> Result<Vec<HotBlog>> {
        self.repo.hot_blogs_in_window(today, 7, HOT_BLOGS_LIMIT).await
    }

    /// Top blogs of the 30 days before today (UTC)
    pub async fn get_30_days_hot_blogs(&self) -> Result<Vec<HotBlog>> {
        self.get_30_days_hot_blogs_on(today()).await
    }

    pub async fn get_30_days_hot_blogs_on(&self, today: NaiveDate) -> Result<Vec<HotBlog>> {
        self.repo.hot_blogs_in_window(today, 30, HOT_BLOGS_LIMIT).await
    }

    /// The 7-day hot list, from cache when present
    pub async fn cached_7_days_hot_blogs(&self) -> Result<Vec<HotBlog>> {
        self.cached_7_days_hot_blogs_on(today()).await
    }

    /// Cache-aside read of the 7-day hot list.
    ///
    /// Cache failures are logged and treated as a miss.
    pub async fn cached_7_days_hot_blogs_on(&self, today: NaiveDate) -> Result<Vec<HotBlog>> {
        if let Some(blogs) = self.read_cached().await {
            tracing::debug!("Cache hit: {}", HOT_BLOGS_FOR_7_DAYS_KEY);
            return Ok(blogs);
        }

        let _guard = self.refresh.lock().await;

        // Another request may have filled the cache while we waited
        if let Some(blogs) = self.read_cached().await {
            tracing::debug!("Cache filled while waiting: {}", HOT_BLOGS_FOR_7_DAYS_KEY);
            return Ok(blogs);
        }

        tracing::debug!("Cache miss: {}", HOT_BLOGS_FOR_7_DAYS_KEY);
        let blogs = self.get_7_days_hot_blogs_on(today).await?;

        if let Err(e) = self
            .cache
            .set(HOT_BLOGS_FOR_7_DAYS_KEY, &blogs, self.cache_ttl)
            .await
        {
            tracing::warn!("Failed to cache {}: {:#}", HOT_BLOGS_FOR_7_DAYS_KEY, e);
        }

        Ok(blogs)
    }

    async fn read_cached(&self) -> Option<Vec<HotBlog>> {
        match self.cache.get::<Vec<HotBlog>>(HOT_BLOGS_FOR_7_DAYS_KEY).await {
            Ok(blogs) => blogs,
            Err(e) => {
                tracing::warn!("Failed to read {} from cache: {:#}", HOT_BLOGS_FOR_7_DAYS_KEY, e);
                None
            }
        }
    }
}

/// Current UTC date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
