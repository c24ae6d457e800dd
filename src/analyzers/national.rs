//! Population-weighted national figures for a single day.

use crate::analyzers::utility::{variance_about, weighted_mean};
use crate::error::MetricsError;
use crate::model::Observation;

/// Total people and people-weighted prevalence across one day's regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NationalEstimate {
    pub total_people: f64,
    pub weighted_prevalence: f64,
}

/// Computes `Σ(peopleᵢ·prevalenceᵢ) / Σpeopleᵢ` over the day's regions.
///
/// # Errors
///
/// Returns [`MetricsError::DivisionByZero`] when no regions report or every
/// region reports zero people.
pub fn national_estimate(day: &[&Observation]) -> Result<NationalEstimate, MetricsError> {
    let pairs: Vec<(f64, f64)> = day
        .iter()
        .map(|o| (o.fcs().people, o.fcs().prevalence))
        .collect();

    let (total_people, weighted_prevalence) = weighted_mean(&pairs).map_err(|_| {
        MetricsError::DivisionByZero(format!(
            "total people is zero across {} region(s)",
            day.len()
        ))
    })?;

    Ok(NationalEstimate {
        total_people,
        weighted_prevalence,
    })
}

/// Spread of regional prevalence around the weighted national estimate.
///
/// Each region counts once regardless of its population:
/// `Σ(prevalenceᵢ − weighted)² / region_count`.
///
/// # Errors
///
/// Returns [`MetricsError::DivisionByZero`] when no regions report.
pub fn national_variance(
    day: &[&Observation],
    weighted_prevalence: f64,
) -> Result<f64, MetricsError> {
    let prevalences: Vec<f64> = day.iter().map(|o| o.fcs().prevalence).collect();
    variance_about(&prevalences, weighted_prevalence)
        .map_err(|_| MetricsError::DivisionByZero("no regions reported".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::{assert_close, obs};

    #[test]
    fn test_two_region_scenario() {
        let day = [
            obs(1, "2023-01-01", 100.0, 0.2),
            obs(2, "2023-01-01", 300.0, 0.4),
        ];
        let refs: Vec<_> = day.iter().collect();

        let estimate = national_estimate(&refs).unwrap();
        assert_eq!(estimate.total_people, 400.0);
        assert_close(estimate.weighted_prevalence, 0.35);

        let variance = national_variance(&refs, estimate.weighted_prevalence).unwrap();
        assert_close(variance, 0.0125);
    }

    #[test]
    fn test_identical_prevalence() {
        let day = [
            obs(1, "2023-01-01", 10.0, 0.25),
            obs(2, "2023-01-01", 990.0, 0.25),
            obs(3, "2023-01-01", 5000.0, 0.25),
        ];
        let refs: Vec<_> = day.iter().collect();

        let estimate = national_estimate(&refs).unwrap();
        assert_close(estimate.weighted_prevalence, 0.25);
        assert_close(national_variance(&refs, estimate.weighted_prevalence).unwrap(), 0.0);
    }

    #[test]
    fn test_order_invariance() {
        let day = [
            obs(1, "2023-01-01", 120.0, 0.11),
            obs(2, "2023-01-01", 40.0, 0.52),
            obs(3, "2023-01-01", 900.0, 0.33),
            obs(4, "2023-01-01", 15.0, 0.07),
        ];
        let forward: Vec<_> = day.iter().collect();
        let reversed: Vec<_> = day.iter().rev().collect();

        let a = national_estimate(&forward).unwrap();
        let b = national_estimate(&reversed).unwrap();
        assert_close(a.weighted_prevalence, b.weighted_prevalence);
        assert_eq!(a.total_people, b.total_people);

        assert_close(
            national_variance(&forward, a.weighted_prevalence).unwrap(),
            national_variance(&reversed, b.weighted_prevalence).unwrap(),
        );
    }

    #[test]
    fn test_zero_people_is_division_by_zero() {
        let day = [obs(1, "2023-01-01", 0.0, 0.2), obs(2, "2023-01-01", 0.0, 0.4)];
        let refs: Vec<_> = day.iter().collect();
        assert!(matches!(
            national_estimate(&refs),
            Err(MetricsError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_no_regions_is_division_by_zero() {
        assert!(matches!(
            national_estimate(&[]),
            Err(MetricsError::DivisionByZero(_))
        ));
        assert!(matches!(
            national_variance(&[], 0.3),
            Err(MetricsError::DivisionByZero(_))
        ));
    }
}
