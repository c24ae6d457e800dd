//! Runtime configuration: the requested date range and environment settings.

use crate::error::ConfigError;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "https://api.hungermapdata.org";
pub const DEFAULT_CACHE_PATH: &str = "last_calculated_data.json";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Inclusive range of days to request from the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Lower bound in the `YYYY-MM-DD` form the source expects.
    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// Upper bound in the `YYYY-MM-DD` form the source expects.
    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Where the read-only cache document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    File(String),
    S3 { bucket: String, key: String },
}

impl CacheLocation {
    /// Where the snapshot job writes, after applying an optional bucket and
    /// key given on the command line. A bucket switches a file location to
    /// S3; a key alone only applies to an S3 location.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyWithoutBucket`] if `key` is set and no
    /// bucket is configured anywhere.
    pub fn snapshot_target(
        self,
        bucket: Option<String>,
        key: Option<String>,
    ) -> Result<CacheLocation, ConfigError> {
        match (bucket, self) {
            (Some(bucket), CacheLocation::File(_)) => Ok(CacheLocation::S3 {
                bucket,
                key: key.unwrap_or_else(|| DEFAULT_CACHE_PATH.to_string()),
            }),
            (Some(bucket), CacheLocation::S3 { key: configured, .. })
            | (None, CacheLocation::S3 { bucket, key: configured }) => Ok(CacheLocation::S3 {
                bucket,
                key: key.unwrap_or(configured),
            }),
            (None, CacheLocation::File(_)) if key.is_some() => Err(ConfigError::KeyWithoutBucket),
            (None, file) => Ok(file),
        }
    }
}

/// Settings read from the environment (after `.env` has been loaded).
///
/// | Variable              | Default                          |
/// |-----------------------|----------------------------------|
/// | `HUNGERMAP_API_URL`   | `https://api.hungermapdata.org`  |
/// | `FETCH_TIMEOUT_SECS`  | `10`                             |
/// | `FCS_CACHE_PATH`      | `last_calculated_data.json`      |
/// | `FCS_CACHE_S3_BUCKET` | unset (use the local file)       |
/// | `FCS_CACHE_S3_KEY`    | `last_calculated_data.json`      |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub fetch_timeout: Duration,
    pub cache: CacheLocation,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            cache: CacheLocation::File(DEFAULT_CACHE_PATH.to_string()),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("HUNGERMAP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let fetch_timeout = match lookup("FETCH_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "Ignoring invalid FETCH_TIMEOUT_SECS");
                    DEFAULT_FETCH_TIMEOUT
                }
            },
            None => DEFAULT_FETCH_TIMEOUT,
        };

        let cache = match lookup("FCS_CACHE_S3_BUCKET").filter(|b| !b.is_empty()) {
            Some(bucket) => CacheLocation::S3 {
                bucket,
                key: lookup("FCS_CACHE_S3_KEY")
                    .unwrap_or_else(|| DEFAULT_CACHE_PATH.to_string()),
            },
            None => CacheLocation::File(
                lookup("FCS_CACHE_PATH").unwrap_or_else(|| DEFAULT_CACHE_PATH.to_string()),
            ),
        };

        Self {
            api_url,
            fetch_timeout,
            cache,
        }
    }
}
