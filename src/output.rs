//! Output formatting for request results.
//!
//! Supports pretty JSON to stdout or a file, and CSV append of the daily
//! national series.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::model::RequestMetrics;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One CSV row: a country's national estimate for one day.
#[derive(Debug, Serialize)]
pub struct DailyRecord<'a> {
    pub country: &'a str,
    pub date: &'a str,
    pub people: f64,
    pub prevalence: f64,
    pub variance: f64,
}

/// Prints a value as pretty-printed JSON on stdout.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON to `path`, replacing any existing file.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    std::fs::write(path, serde_json::to_vec_pretty(value)?)?;
    debug!(path, "JSON written");
    Ok(())
}

/// Appends every country's daily national estimates to a CSV file.
///
/// Creates the file with headers if it does not already exist. Returns the
/// number of rows written.
pub fn append_daily_records(path: &str, metrics: &RequestMetrics) -> Result<usize> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    let mut rows = 0;
    for (country, country_metrics) in &metrics.countries {
        for (date, estimate) in &country_metrics.metrics().metric_b {
            writer.serialize(DailyRecord {
                country,
                date,
                people: estimate.people,
                prevalence: estimate.prevalence,
                variance: estimate.variance,
            })?;
            rows += 1;
        }
    }
    writer.flush()?;

    Ok(rows)
}
