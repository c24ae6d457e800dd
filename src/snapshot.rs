//! Offline job that refreshes the cache document.
//!
//! Runs outside the request path: it computes fresh metrics for each
//! country and overwrites that country's entry. Countries that fail keep
//! whatever entry the document already had.

use anyhow::Result;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

use crate::cache::{CacheDocument, parse_document};
use crate::config::DateRange;
use crate::orchestrator::compute_fresh;
use crate::sources::DataSource;

/// What a refresh did to each country.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    pub refreshed: Vec<String>,
    /// Failed to compute; previous entry (if any) left in place.
    pub failed: Vec<String>,
}

/// Recomputes each country and merges successes into `document`.
#[tracing::instrument(skip(source, document), fields(start = %range.start, end = %range.end))]
pub async fn refresh_document<S, T>(
    source: &S,
    countries: &[T],
    range: &DateRange,
    document: &mut CacheDocument,
) -> SnapshotReport
where
    S: DataSource + ?Sized,
    T: AsRef<str> + std::fmt::Debug,
{
    let mut report = SnapshotReport::default();

    for country in countries {
        let country = country.as_ref();
        match compute_fresh(source, country, range).await {
            Ok(metrics) => match serde_json::to_value(&metrics) {
                Ok(entry) => {
                    document.insert(country.to_string(), entry);
                    report.refreshed.push(country.to_string());
                }
                Err(err) => {
                    warn!(country, error = %err, "Could not encode refreshed metrics");
                    report.failed.push(country.to_string());
                }
            },
            Err(err) => {
                warn!(
                    country,
                    error = %err,
                    kept_previous = document.contains_key(country),
                    "Snapshot refresh failed"
                );
                report.failed.push(country.to_string());
            }
        }
    }

    info!(
        refreshed = report.refreshed.len(),
        failed = report.failed.len(),
        "Snapshot refresh complete"
    );
    report
}

/// Loads the cache document at `path`, or an empty one if the file is absent.
pub fn load_document_file(path: &Path) -> Result<CacheDocument> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(parse_document(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(CacheDocument::new()),
        Err(e) => Err(e.into()),
    }
}

/// Writes the document next to `path` and renames it into place so readers
/// never observe a half-written file.
pub fn write_document_file(path: &Path, document: &CacheDocument) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec(document)?)?;
    std::fs::rename(&tmp, path)?;
    info!(path = %path.display(), countries = document.len(), "Snapshot written");
    Ok(())
}

/// Serializes a value to JSON and uploads it to an S3 bucket with `application/json` content type.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
) -> Result<()> {
    let body = serde_json::to_vec(value)?;

    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body.into())
        .content_type("application/json")
        .send()
        .await?;

    info!(bucket, key, "Snapshot uploaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, MetricsError};
    use crate::model::{CountryMetrics, Observation};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::env;
    use std::fs;

    /// Only knows about COL.
    struct ColOnly;

    #[async_trait]
    impl DataSource for ColOnly {
        async fn fetch_observations(
            &self,
            country: &str,
            _range: &DateRange,
        ) -> Result<Vec<Observation>, MetricsError> {
            if country != "COL" {
                return Err(FetchError::Status(reqwest::StatusCode::NOT_FOUND).into());
            }
            Ok(vec![
                serde_json::from_value(json!({
                    "region": {"id": 1},
                    "date": "2023-01-01",
                    "metrics": {"fcs": {"people": 10, "prevalence": 0.5}}
                }))
                .unwrap(),
            ])
        }
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
        )
    }

    fn empty_entry() -> serde_json::Value {
        serde_json::to_value(CountryMetrics {
            metric_a: vec![],
            metric_b: BTreeMap::new(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_refresh_keeps_previous_entry_on_failure() {
        let mut document = CacheDocument::new();
        document.insert("COL".into(), empty_entry());
        document.insert("BFA".into(), json!({"metric_a": [], "metric_b": {}, "note": "kept"}));

        let report = refresh_document(&ColOnly, &["COL", "BFA"], &range(), &mut document).await;

        assert_eq!(report.refreshed, vec!["COL".to_string()]);
        assert_eq!(report.failed, vec!["BFA".to_string()]);
        assert_eq!(document["COL"]["metric_b"]["2023-01-01"]["people"], 10.0);
        assert_eq!(
            document["BFA"],
            json!({"metric_a": [], "metric_b": {}, "note": "kept"})
        );
    }

    #[test]
    fn test_file_round_trip() {
        let path = env::temp_dir().join("fcs_snapshot_test.json");
        let _ = fs::remove_file(&path);

        assert!(load_document_file(&path).unwrap().is_empty());

        let mut document = CacheDocument::new();
        document.insert("COL".into(), empty_entry());
        write_document_file(&path, &document).unwrap();

        assert_eq!(load_document_file(&path).unwrap(), document);

        fs::remove_file(&path).unwrap();
    }
}
