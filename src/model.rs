//! Data types shared by the fetch, aggregation and cache layers.

use crate::error::MetricsError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Administrative region attached to an observation.
///
/// Kept as the raw JSON object so display attributes (name, population, …)
/// pass through to the output untouched. Only `id` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(pub serde_json::Map<String, serde_json::Value>);

/// Identity of a region. A numeric `1` and a string `"1"` are different
/// regions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionId {
    /// Canonical text of a JSON number id.
    Number(String),
    Text(String),
}

impl Region {
    /// Returns the region's identity.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::MalformedRecord`] if `id` is absent or is
    /// neither a number nor a string.
    pub fn id(&self) -> Result<RegionId, MetricsError> {
        match self.0.get("id") {
            Some(serde_json::Value::Number(n)) => Ok(RegionId::Number(n.to_string())),
            Some(serde_json::Value::String(s)) => Ok(RegionId::Text(s.clone())),
            Some(other) => Err(MetricsError::MalformedRecord(format!(
                "region id must be a number or string, got {other}"
            ))),
            None => Err(MetricsError::MalformedRecord(
                "region has no id".to_string(),
            )),
        }
    }
}

/// Food consumption score pair reported for one region on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FcsMetric {
    pub people: f64,
    pub prevalence: f64,
}

/// The `metrics` object of a raw record. Other indicators are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationMetrics {
    pub fcs: FcsMetric,
}

/// One raw record: a single region on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub region: Region,
    /// Calendar day as delivered by the source (`YYYY-MM-DD`).
    pub date: String,
    pub metrics: ObservationMetrics,
}

impl Observation {
    pub fn fcs(&self) -> FcsMetric {
        self.metrics.fcs
    }
}

/// Calendar month bucket, rendered as `YYYY-M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthLabel {
    pub year: i32,
    pub month: u32,
}

impl MonthLabel {
    /// Truncates an ISO day string to its (year, month).
    ///
    /// Anything after the leading `YYYY-MM-DD` (e.g. a time component) is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::MalformedRecord`] if the string does not start
    /// with a valid calendar day.
    pub fn from_date(date: &str) -> Result<Self, MetricsError> {
        let day = date.get(..10).unwrap_or(date);
        let parsed = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
            MetricsError::MalformedRecord(format!("invalid date {date:?}: {e}"))
        })?;
        Ok(Self {
            year: parsed.year(),
            month: parsed.month(),
        })
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

impl FromStr for MonthLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("month label {s:?} is not YYYY-M"))?;
        let year = year
            .parse()
            .map_err(|e| format!("month label {s:?}: bad year: {e}"))?;
        let month: u32 = month
            .parse()
            .map_err(|e| format!("month label {s:?}: bad month: {e}"))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month label {s:?}: month out of range"));
        }
        Ok(Self { year, month })
    }
}

impl Serialize for MonthLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Mean people and prevalence for one region over one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    pub people: f64,
    pub prevalence: f64,
}

/// Metric A entry: a region with its month-keyed averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAverage {
    pub region: Region,
    pub average: BTreeMap<MonthLabel, MonthlyAverage>,
}

/// Metric B entry: national figures for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyNationalEstimate {
    /// Total people across reporting regions.
    pub people: f64,
    /// People-weighted mean prevalence.
    pub prevalence: f64,
    /// Mean squared deviation of regional prevalence from the weighted mean,
    /// averaged over regions (not people).
    pub variance: f64,
}

/// Both aggregate views for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMetrics {
    pub metric_a: Vec<RegionAverage>,
    pub metric_b: BTreeMap<String, DailyNationalEstimate>,
}

/// A cache entry, kept exactly as stored.
///
/// The entry is checked against the [`CountryMetrics`] shape when it is
/// read, but serializes back as the original JSON, including unknown fields
/// and the original spelling of month labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedMetrics {
    raw: serde_json::Value,
    metrics: CountryMetrics,
}

impl CachedMetrics {
    /// Validates one country's cache entry.
    ///
    /// # Errors
    ///
    /// Returns the decoding error if the entry is not a country result.
    pub fn from_entry(raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        let metrics = CountryMetrics::deserialize(&raw)?;
        Ok(Self { raw, metrics })
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.raw
    }

    pub fn metrics(&self) -> &CountryMetrics {
        &self.metrics
    }
}

impl Serialize for CachedMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Which path produced a country's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Fresh,
    Cached,
}

/// One country's result: computed from fresh observations, or served
/// unmodified from the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CountryResult {
    Fresh(CountryMetrics),
    Cached(CachedMetrics),
}

impl CountryResult {
    pub fn provenance(&self) -> Provenance {
        match self {
            CountryResult::Fresh(_) => Provenance::Fresh,
            CountryResult::Cached(_) => Provenance::Cached,
        }
    }

    pub fn metrics(&self) -> &CountryMetrics {
        match self {
            CountryResult::Fresh(metrics) => metrics,
            CountryResult::Cached(cached) => cached.metrics(),
        }
    }
}

/// Per-request result keyed by country code.
///
/// Serializes as the bare country map. Countries with neither fresh nor
/// cached metrics are left out of the map and listed in `unavailable`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestMetrics {
    pub countries: BTreeMap<String, CountryResult>,
    #[serde(skip)]
    pub unavailable: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn region(value: serde_json::Value) -> Region {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_region_id_number_and_string() {
        assert_eq!(
            region(json!({"id": 42, "name": "Antioquia"})).id().unwrap(),
            RegionId::Number("42".into())
        );
        assert_eq!(
            region(json!({"id": "BF-01"})).id().unwrap(),
            RegionId::Text("BF-01".into())
        );
    }

    #[test]
    fn test_numeric_and_text_ids_differ() {
        let number = region(json!({"id": 1})).id().unwrap();
        let text = region(json!({"id": "1"})).id().unwrap();
        assert_ne!(number, text);
    }

    #[test]
    fn test_region_without_id_is_malformed() {
        let err = region(json!({"name": "Nowhere"})).id().unwrap_err();
        assert!(matches!(err, MetricsError::MalformedRecord(_)));
    }

    #[test]
    fn test_month_label_from_date() {
        let label = MonthLabel::from_date("2022-06-15").unwrap();
        assert_eq!(label, MonthLabel { year: 2022, month: 6 });
        assert_eq!(label.to_string(), "2022-6");

        let with_time = MonthLabel::from_date("2023-11-02T00:00:00Z").unwrap();
        assert_eq!(with_time.to_string(), "2023-11");
    }

    #[test]
    fn test_month_label_rejects_garbage() {
        assert!(MonthLabel::from_date("June 2022").is_err());
        assert!("2022-13".parse::<MonthLabel>().is_err());
        assert!("2022".parse::<MonthLabel>().is_err());
    }

    #[test]
    fn test_month_labels_order_chronologically() {
        let oct: MonthLabel = "2022-10".parse().unwrap();
        let jun: MonthLabel = "2022-6".parse().unwrap();
        let jan: MonthLabel = "2023-1".parse().unwrap();
        assert!(jun < oct);
        assert!(oct < jan);
    }

    #[test]
    fn test_request_metrics_serializes_as_country_map() {
        let mut metrics = RequestMetrics::default();
        metrics.countries.insert(
            "COL".into(),
            CountryResult::Fresh(CountryMetrics {
                metric_a: vec![],
                metric_b: BTreeMap::new(),
            }),
        );
        metrics.unavailable.push("BFA".into());

        let value = serde_json::to_value(&metrics).unwrap();
        assert_eq!(value, json!({"COL": {"metric_a": [], "metric_b": {}}}));
    }

    #[test]
    fn test_observation_deserializes_source_record() {
        let obs: Observation = serde_json::from_value(json!({
            "region": {"id": 7, "name": "Sahel", "population": 1200000},
            "date": "2023-01-04",
            "metrics": {
                "fcs": {"people": 350000, "prevalence": 0.29},
                "rcsi": {"people": 10, "prevalence": 0.1}
            }
        }))
        .unwrap();

        assert_eq!(obs.fcs().people, 350000.0);
        assert_eq!(obs.fcs().prevalence, 0.29);
        assert_eq!(obs.region.0["name"], json!("Sahel"));
    }

    #[test]
    fn test_cached_metrics_serialize_verbatim() {
        let raw = json!({
            "metric_a": [{
                "region": {"id": 3, "name": "Nord"},
                "average": {"2022-06": {"people": 5.0, "prevalence": 0.5}}
            }],
            "metric_b": {},
            "generated_by": "nightly"
        });

        let cached = CachedMetrics::from_entry(raw.clone()).unwrap();
        let june = MonthLabel { year: 2022, month: 6 };
        assert_eq!(cached.metrics().metric_a[0].average[&june].people, 5.0);

        let result = CountryResult::Cached(cached);
        assert_eq!(result.provenance(), Provenance::Cached);
        assert_eq!(serde_json::to_value(&result).unwrap(), raw);
    }

    #[test]
    fn test_cached_metrics_rejects_wrong_shape() {
        let raw = json!({"metric_a": [], "metric_b": {"2023-01-01": {"people": 1.0, "prevalence": 0.1}}});
        assert!(CachedMetrics::from_entry(raw).is_err());
    }
}
