use async_trait::async_trait;
use tracing::{debug, info};

use super::DataSource;
use crate::config::DateRange;
use crate::error::{FetchError, MetricsError};
use crate::fetch::{BasicClient, HttpClient, fetch_json};
use crate::model::Observation;

/// Reads regional food security series from the HungerMap API.
pub struct HungerMapSource<C = BasicClient> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> HungerMapSource<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds the regional endpoint URL for `country` and `range`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the base URL does not parse.
    pub fn region_url(&self, country: &str, range: &DateRange) -> Result<String, FetchError> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = reqwest::Url::parse(&format!(
            "{base}/v1/foodsecurity/country/{country}/region"
        ))
        .map_err(|e| FetchError::InvalidUrl {
            url: base.to_string(),
            message: e.to_string(),
        })?;

        url.query_pairs_mut()
            .append_pair("date_start", &range.start_param())
            .append_pair("date_end", &range.end_param());

        Ok(url.into())
    }
}

#[async_trait]
impl<C: HttpClient> DataSource for HungerMapSource<C> {
    #[tracing::instrument(skip(self), fields(start = %range.start, end = %range.end))]
    async fn fetch_observations(
        &self,
        country: &str,
        range: &DateRange,
    ) -> Result<Vec<Observation>, MetricsError> {
        let url = self.region_url(country, range)?;
        debug!(url = %url, "Requesting regional series");

        let payload = fetch_json(&self.client, &url).await?;
        let observations = parse_observations(payload)?;

        info!(records = observations.len(), "Regional series fetched");
        Ok(observations)
    }
}

/// Converts a decoded response body into observations.
///
/// The body must be an array of records, each carrying `region`, `date` and
/// `metrics.fcs.{people,prevalence}`.
///
/// # Errors
///
/// Returns [`MetricsError::MalformedRecord`] naming the first offending
/// record.
pub fn parse_observations(payload: serde_json::Value) -> Result<Vec<Observation>, MetricsError> {
    let serde_json::Value::Array(records) = payload else {
        return Err(MetricsError::MalformedRecord(
            "expected an array of regional records".to_string(),
        ));
    };

    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            serde_json::from_value(record)
                .map_err(|e| MetricsError::MalformedRecord(format!("record {idx}: {e}")))
        })
        .collect()
}
