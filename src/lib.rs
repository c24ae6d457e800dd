pub mod analyzers;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod snapshot;
pub mod sources;

pub use config::DateRange;
pub use error::MetricsError;
pub use model::{CachedMetrics, CountryMetrics, CountryResult, Provenance, RequestMetrics};
pub use orchestrator::MetricsService;
