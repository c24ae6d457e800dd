use async_trait::async_trait;

use super::{CacheDocument, CacheStore, decode_entry};
use crate::error::CacheError;
use crate::model::{CachedMetrics, CountryMetrics};

/// Cache document held in memory. Useful for tests and for callers that
/// already loaded the document.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache(pub CacheDocument);

impl MemoryCache {
    /// Stores `metrics` as `country`'s entry.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if `metrics` cannot be encoded.
    pub fn with_entry(self, country: &str, metrics: &CountryMetrics) -> Result<Self, serde_json::Error> {
        Ok(self.with_raw_entry(country, serde_json::to_value(metrics)?))
    }

    /// Stores an arbitrary JSON value as `country`'s entry.
    pub fn with_raw_entry(mut self, country: &str, raw: serde_json::Value) -> Self {
        self.0.insert(country.to_string(), raw);
        self
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, country: &str) -> Result<Option<CachedMetrics>, CacheError> {
        self.0
            .get(country)
            .map(|raw| decode_entry(country, raw.clone()))
            .transpose()
    }
}
