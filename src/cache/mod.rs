//! Read-only access to the last-known-good metrics document.
//!
//! The document is a JSON object keyed by country code whose values are
//! country results (`metric_a`, `metric_b`). Nothing in the request path
//! writes it; see [`crate::snapshot`] for the job that does.
//!
//! Entries stay raw JSON until one is looked up, so a damaged entry only
//! affects its own country.

mod file;
mod memory;
mod s3;

pub use file::JsonFileCache;
pub use memory::MemoryCache;
pub use s3::S3Cache;

use crate::error::CacheError;
use crate::model::CachedMetrics;
use std::collections::BTreeMap;

/// The whole cache document: country code to raw entry.
pub type CacheDocument = BTreeMap<String, serde_json::Value>;

/// Keyed lookup of previously computed country metrics.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the cached entry for `country`, or `None` if there is no entry.
    async fn get(&self, country: &str) -> Result<Option<CachedMetrics>, CacheError>;
}

#[async_trait::async_trait]
impl CacheStore for Box<dyn CacheStore> {
    async fn get(&self, country: &str) -> Result<Option<CachedMetrics>, CacheError> {
        (**self).get(country).await
    }
}

/// Decodes a cache document without interpreting the entries.
///
/// # Errors
///
/// Returns [`CacheError::Json`] if the bytes are not a JSON object.
pub fn parse_document(bytes: &[u8]) -> Result<CacheDocument, CacheError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Takes `country`'s entry out of `document` and validates it.
///
/// # Errors
///
/// Returns [`CacheError::InvalidEntry`] if the entry is not a country result.
pub fn take_entry(
    document: &mut CacheDocument,
    country: &str,
) -> Result<Option<CachedMetrics>, CacheError> {
    document
        .remove(country)
        .map(|raw| decode_entry(country, raw))
        .transpose()
}

fn decode_entry(country: &str, raw: serde_json::Value) -> Result<CachedMetrics, CacheError> {
    CachedMetrics::from_entry(raw).map_err(|source| CacheError::InvalidEntry {
        country: country.to_string(),
        source,
    })
}
