//! Per-country fetch, compute and fall-back logic.
//!
//! A country is resolved by fetching its observations and building both
//! metric views. If either step fails with a recoverable error the whole
//! fresh attempt is discarded and the cached result for that country is
//! returned as-is. Fresh and cached data are never mixed.

use tracing::{error, info, warn};

use crate::analyzers::build_country_metrics;
use crate::cache::CacheStore;
use crate::config::DateRange;
use crate::error::MetricsError;
use crate::model::{CachedMetrics, CountryMetrics, CountryResult, RequestMetrics};
use crate::sources::DataSource;

/// Fetches `country`'s observations and builds both metric views, with no
/// fallback.
///
/// # Errors
///
/// Returns the fetch error, or the first aggregation error.
pub async fn compute_fresh<S>(
    source: &S,
    country: &str,
    range: &DateRange,
) -> Result<CountryMetrics, MetricsError>
where
    S: DataSource + ?Sized,
{
    let observations = source.fetch_observations(country, range).await?;
    build_country_metrics(&observations)
}

/// Resolves metrics for requested countries against a data source, falling
/// back to a read-only cache store.
pub struct MetricsService<S, C> {
    source: S,
    cache: C,
}

impl<S: DataSource, C: CacheStore> MetricsService<S, C> {
    pub fn new(source: S, cache: C) -> Self {
        Self { source, cache }
    }

    /// Returns the metrics for one country, fresh if possible and the cached
    /// entry otherwise. [`CountryResult::provenance`] tells which.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::NoFallbackAvailable`] if fresh computation
    /// failed and the cache has no usable entry for `country`.
    #[tracing::instrument(skip(self), fields(start = %range.start, end = %range.end))]
    pub async fn get_country_metrics(
        &self,
        country: &str,
        range: &DateRange,
    ) -> Result<CountryResult, MetricsError> {
        match compute_fresh(&self.source, country, range).await {
            Ok(metrics) => {
                info!(
                    regions = metrics.metric_a.len(),
                    days = metrics.metric_b.len(),
                    "Fresh metrics computed"
                );
                Ok(CountryResult::Fresh(metrics))
            }
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "Fresh computation failed, falling back to cache");
                self.fallback(country).await.map(CountryResult::Cached)
            }
            Err(err) => Err(err),
        }
    }

    /// Resolves each requested country in order and merges the results by
    /// country code.
    ///
    /// A country with neither fresh nor cached metrics is left out of the map
    /// and recorded in [`RequestMetrics::unavailable`]; the other countries
    /// are unaffected.
    pub async fn get_request_metrics<T: AsRef<str>>(
        &self,
        countries: &[T],
        range: &DateRange,
    ) -> RequestMetrics {
        let mut result = RequestMetrics::default();

        for country in countries {
            let country = country.as_ref();
            match self.get_country_metrics(country, range).await {
                Ok(metrics) => {
                    result.countries.insert(country.to_string(), metrics);
                }
                Err(err) => {
                    warn!(country, error = %err, "Country omitted from result");
                    result.unavailable.push(country.to_string());
                }
            }
        }

        result
    }

    async fn fallback(&self, country: &str) -> Result<CachedMetrics, MetricsError> {
        match self.cache.get(country).await {
            Ok(Some(cached)) => {
                info!("Serving cached metrics");
                Ok(cached)
            }
            Ok(None) => {
                warn!("Cache has no entry for country");
                Err(MetricsError::NoFallbackAvailable {
                    country: country.to_string(),
                })
            }
            Err(err) => {
                error!(error = %err, "Cache store could not be read");
                Err(MetricsError::NoFallbackAvailable {
                    country: country.to_string(),
                })
            }
        }
    }
}
