use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use super::{CacheStore, parse_document, take_entry};
use crate::error::CacheError;
use crate::model::CachedMetrics;

/// Cache document stored as a local JSON file, re-read on every lookup.
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CacheStore for JsonFileCache {
    async fn get(&self, country: &str) -> Result<Option<CachedMetrics>, CacheError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Cache file does not exist");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut document = parse_document(&bytes)?;
        take_entry(&mut document, country)
    }
}
