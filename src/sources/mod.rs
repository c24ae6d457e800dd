//! Where raw observations come from.

mod hungermap;

pub use hungermap::{HungerMapSource, parse_observations};

use crate::config::DateRange;
use crate::error::MetricsError;
use crate::model::Observation;

/// Abstraction over a provider of per-region daily food security records.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Returns every observation for `country` within `range`.
    ///
    /// Transport and decoding problems surface as
    /// [`MetricsError::FetchFailure`]; records of the wrong shape as
    /// [`MetricsError::MalformedRecord`].
    async fn fetch_observations(
        &self,
        country: &str,
        range: &DateRange,
    ) -> Result<Vec<Observation>, MetricsError>;
}
