//! Error types for fetching, aggregating and falling back to cached metrics.

/// Errors that can occur while producing a country's metrics.
///
/// Only [`MetricsError::FetchFailure`], [`MetricsError::MalformedRecord`] and
/// [`MetricsError::DivisionByZero`] are recoverable: the orchestrator answers
/// them with the cached result. [`MetricsError::NoFallbackAvailable`] is the
/// one condition that escapes the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// The data source could not be reached or returned an unusable payload.
    #[error("fetch failed: {0}")]
    FetchFailure(#[from] FetchError),

    /// A record is missing a field the aggregation needs.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A mean or weighted mean was requested over an empty or zero-weight set.
    #[error("division by zero: {0}")]
    DivisionByZero(String),

    /// Fresh computation failed and the cache store holds nothing for the country.
    #[error("no cached metrics available for {country}")]
    NoFallbackAvailable {
        /// Country code that was requested.
        country: String,
    },
}

impl MetricsError {
    /// Returns `true` for the error kinds answered with a cached result.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MetricsError::FetchFailure(_)
            | MetricsError::MalformedRecord(_)
            | MetricsError::DivisionByZero(_) => true,
            MetricsError::NoFallbackAvailable { .. } => false,
        }
    }
}

/// Transport and payload failures talking to the data source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request URL could not be built.
    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Connection failure, timeout or body read failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// The response body is not JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reading the cache document.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("S3 error: {0}")]
    S3(String),

    /// One country's entry does not have the country result shape. Other
    /// entries in the same document are unaffected.
    #[error("cache entry for {country} is invalid: {source}")]
    InvalidEntry {
        country: String,
        source: serde_json::Error,
    },
}

/// Inconsistent command-line or environment settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("an S3 key was given but no S3 bucket is configured")]
    KeyWithoutBucket,
}
