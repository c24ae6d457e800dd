//! Aggregation pipeline.
//!
//! Raw observations are grouped by region and averaged per month (metric A),
//! and grouped by day to produce population-weighted national estimates with
//! their spread across regions (metric B).

pub mod aggregate;
pub mod group;
pub mod monthly;
pub mod national;
pub mod utility;

pub use aggregate::{build_country_metrics, build_metric_a, build_metric_b};

#[cfg(test)]
pub(crate) mod testing {
    use crate::model::{FcsMetric, Observation, ObservationMetrics, Region};
    use serde_json::json;

    pub fn obs(region_id: i64, date: &str, people: f64, prevalence: f64) -> Observation {
        let region = match json!({"id": region_id, "name": format!("Region {region_id}")}) {
            serde_json::Value::Object(map) => Region(map),
            _ => unreachable!(),
        };
        Observation {
            region,
            date: date.to_string(),
            metrics: ObservationMetrics {
                fcs: FcsMetric { people, prevalence },
            },
        }
    }

    pub fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }
}
