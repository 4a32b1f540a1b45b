//! Cache layer
//!
//! Process-wide cache used for cache-aside reads such as the 7-day hot
//! list. Values are stored serialized, so any `Serialize` type can be
//! cached under a string key with its own TTL.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tidings::cache::{create_cache, CacheLayer};
//! use tidings::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default());
//! cache.set("key", &"value", Duration::from_secs(60)).await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Cache layer trait
///
/// The methods are generic over the stored type, so the trait is not
/// object safe; services hold the concrete [`Cache`] instead.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value, `Ok(None)` when the key is absent or expired
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value with its own TTL, overwriting any previous entry
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;
}

/// The cache implementation shared by the application
pub type Cache = MemoryCache;

/// Create the shared cache from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<Cache> {
    let ttl = Duration::from_secs(config.ttl_seconds);
    Arc::new(MemoryCache::with_capacity_and_ttl(config.max_capacity, ttl))
}
