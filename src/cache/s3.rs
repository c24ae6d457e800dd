use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use tracing::debug;

use super::{CacheDocument, CacheStore, parse_document, take_entry};
use crate::error::CacheError;
use crate::model::CachedMetrics;

/// Cache document stored as a single JSON object in S3.
pub struct S3Cache {
    client: aws_sdk_s3::Client,
    bucket: String,
    key: String,
}

impl S3Cache {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Downloads the whole document, or `None` if the object does not exist.
    pub async fn load_document(&self) -> Result<Option<CacheDocument>, CacheError> {
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    debug!(bucket = %self.bucket, key = %self.key, "Cache object does not exist");
                    return Ok(None);
                }
                return Err(CacheError::S3(DisplayErrorContext(&e).to_string()));
            }
        };

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| CacheError::S3(e.to_string()))?
            .into_bytes();

        Ok(Some(parse_document(&body)?))
    }
}

#[async_trait]
impl CacheStore for S3Cache {
    async fn get(&self, country: &str) -> Result<Option<CachedMetrics>, CacheError> {
        match self.load_document().await? {
            Some(mut document) => take_entry(&mut document, country),
            None => Ok(None),
        }
    }
}
