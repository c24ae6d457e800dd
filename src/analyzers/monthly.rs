use crate::analyzers::group::group_by_key;
use crate::analyzers::utility::mean;
use crate::error::MetricsError;
use crate::model::{MonthLabel, MonthlyAverage, Observation};
use std::collections::BTreeMap;

/// Averages one region's series per calendar month.
///
/// Each month's `people` and `prevalence` are plain arithmetic means over
/// the observations dated in that month. No rounding is applied.
///
/// # Errors
///
/// Returns [`MetricsError::MalformedRecord`] for an unparseable date.
pub fn monthly_average(
    observations: &[&Observation],
) -> Result<BTreeMap<MonthLabel, MonthlyAverage>, MetricsError> {
    let buckets = group_by_key(observations.iter().copied(), |obs| {
        MonthLabel::from_date(&obs.date)
    })?;

    buckets
        .into_iter()
        .map(|(label, bucket)| {
            let people: Vec<f64> = bucket.iter().map(|o| o.fcs().people).collect();
            let prevalence: Vec<f64> = bucket.iter().map(|o| o.fcs().prevalence).collect();

            let average = MonthlyAverage {
                people: mean(&people)?,
                prevalence: mean(&prevalence)?,
            };
            Ok((label, average))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::testing::{assert_close, obs};

    #[test]
    fn test_two_observations_same_month() {
        let series = [
            obs(7, "2023-02-03", 50.0, 0.1),
            obs(7, "2023-02-20", 70.0, 0.3),
        ];
        let refs: Vec<_> = series.iter().collect();

        let averages = monthly_average(&refs).unwrap();
        let feb = averages[&MonthLabel { year: 2023, month: 2 }];

        assert_eq!(averages.len(), 1);
        assert_close(feb.people, 60.0);
        assert_close(feb.prevalence, 0.2);
    }

    #[test]
    fn test_single_observation_month_is_identity() {
        let series = [
            obs(7, "2022-12-31", 123.0, 0.37),
            obs(7, "2023-01-01", 50.0, 0.1),
            obs(7, "2023-01-02", 70.0, 0.3),
        ];
        let refs: Vec<_> = series.iter().collect();

        let averages = monthly_average(&refs).unwrap();
        let dec = averages[&MonthLabel { year: 2022, month: 12 }];

        assert_eq!(dec.people, 123.0);
        assert_eq!(dec.prevalence, 0.37);
        assert_eq!(averages.len(), 2);
    }

    #[test]
    fn test_months_from_different_years_are_distinct() {
        let series = [obs(1, "2022-06-10", 10.0, 0.1), obs(1, "2023-06-10", 30.0, 0.3)];
        let refs: Vec<_> = series.iter().collect();

        let labels: Vec<String> = monthly_average(&refs)
            .unwrap()
            .keys()
            .map(ToString::to_string)
            .collect();
        assert_eq!(labels, vec!["2022-6", "2023-6"]);
    }

    #[test]
    fn test_empty_series() {
        assert!(monthly_average(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_bad_date() {
        let series = [obs(1, "06/10/2022", 10.0, 0.1)];
        let refs: Vec<_> = series.iter().collect();
        assert!(matches!(
            monthly_average(&refs),
            Err(MetricsError::MalformedRecord(_))
        ));
    }
}
