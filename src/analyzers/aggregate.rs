use crate::analyzers::group::{group_by_date, group_by_region};
use crate::analyzers::monthly::monthly_average;
use crate::analyzers::national::{national_estimate, national_variance};
use crate::error::MetricsError;
use crate::model::{CountryMetrics, DailyNationalEstimate, Observation, RegionAverage};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds metric A: one entry per region with its monthly averages.
///
/// The region descriptor of each entry is taken from the region's first
/// observation.
///
/// # Errors
///
/// Returns [`MetricsError::MalformedRecord`] for a record with no region id
/// or an unparseable date.
pub fn build_metric_a(observations: &[Observation]) -> Result<Vec<RegionAverage>, MetricsError> {
    group_by_region(observations)?
        .into_iter()
        .map(|group| {
            let average = monthly_average(&group.observations)?;
            Ok(RegionAverage {
                region: group.region.clone(),
                average,
            })
        })
        .collect()
}

/// Builds metric B: national people, weighted prevalence and variance per day.
///
/// # Errors
///
/// Any day that fails aborts the whole computation, typically with
/// [`MetricsError::DivisionByZero`] for a day on which nobody was counted.
pub fn build_metric_b(
    observations: &[Observation],
) -> Result<BTreeMap<String, DailyNationalEstimate>, MetricsError> {
    group_by_date(observations)?
        .into_iter()
        .map(|(date, day)| {
            let estimate = national_estimate(&day).map_err(|e| on_day(&date, e))?;
            let variance = national_variance(&day, estimate.weighted_prevalence)
                .map_err(|e| on_day(&date, e))?;

            Ok((
                date,
                DailyNationalEstimate {
                    people: estimate.total_people,
                    prevalence: estimate.weighted_prevalence,
                    variance,
                },
            ))
        })
        .collect()
}

/// Builds both views for one country's observations.
///
/// # Errors
///
/// Returns the first error from [`build_metric_a`] or [`build_metric_b`].
pub fn build_country_metrics(observations: &[Observation]) -> Result<CountryMetrics, MetricsError> {
    let metric_a = build_metric_a(observations)?;
    let metric_b = build_metric_b(observations)?;

    debug!(
        records = observations.len(),
        regions = metric_a.len(),
        days = metric_b.len(),
        "Country metrics computed"
    );

    Ok(CountryMetrics { metric_a, metric_b })
}

fn on_day(date: &str, err: MetricsError) -> MetricsError {
    match err {
        MetricsError::DivisionByZero(msg) => MetricsError::DivisionByZero(format!("{date}: {msg}")),
        other => other,
    }
}
