//! CLI entry point for the food security metrics tool.
//!
//! Provides subcommands for computing regional/national metrics for a set of
//! countries and for refreshing the last-known-good cache document.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use food_security_metrics::cache::{CacheDocument, CacheStore, JsonFileCache, S3Cache};
use food_security_metrics::config::{CacheLocation, Settings};
use food_security_metrics::fetch::BasicClient;
use food_security_metrics::output::{append_daily_records, print_json, write_json};
use food_security_metrics::snapshot::{
    load_document_file, refresh_document, write_document_file, write_json_to_s3,
};
use food_security_metrics::sources::HungerMapSource;
use food_security_metrics::{DateRange, MetricsService};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "food_security_metrics")]
#[command(about = "Regional and national food consumption score metrics", long_about = None)]
struct Cli {
    /// Base URL of the HungerMap API (overrides HUNGERMAP_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Fetch timeout in seconds (overrides FETCH_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Local cache document (overrides FCS_CACHE_PATH and FCS_CACHE_S3_BUCKET)
    #[arg(long, global = true)]
    cache_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics for countries, falling back to the cache on failure
    Metrics {
        /// Comma-separated ISO3 country codes
        #[arg(short, long, value_delimiter = ',', default_values_t = ["COL".to_string(), "BFA".to_string()])]
        countries: Vec<String>,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Write the JSON result here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// CSV file to append the daily national series to
        #[arg(long)]
        csv: Option<String>,
    },
    /// Recompute countries and refresh the cache document
    Snapshot {
        /// Comma-separated ISO3 country codes
        #[arg(short, long, value_delimiter = ',', default_values_t = ["COL".to_string(), "BFA".to_string()])]
        countries: Vec<String>,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Optional: S3 bucket to upload the document to instead of the local file
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Object key; needs --s3-bucket or FCS_CACHE_S3_BUCKET
        #[arg(long)]
        s3_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/food_security_metrics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("food_security_metrics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = apply_overrides(Settings::from_env(), &cli);

    let client = BasicClient::with_timeout(settings.fetch_timeout)?;
    let source = HungerMapSource::new(client, settings.api_url.clone());

    match cli.command {
        Commands::Metrics {
            countries,
            start,
            end,
            output,
            csv,
        } => {
            let range = DateRange::new(start, end);
            let cache = open_cache(&settings.cache).await;
            let service = MetricsService::new(source, cache);

            let result = service.get_request_metrics(&countries, &range).await;
            if !result.unavailable.is_empty() {
                warn!(countries = ?result.unavailable, "No metrics available for some countries");
            }

            match output {
                Some(path) => write_json(&path, &result)?,
                None => print_json(&result)?,
            }

            if let Some(csv_path) = csv {
                let rows = append_daily_records(&csv_path, &result)?;
                info!(path = %csv_path, rows, "Daily national series appended");
            }
        }
        Commands::Snapshot {
            countries,
            start,
            end,
            s3_bucket,
            s3_key,
        } => {
            let range = DateRange::new(start, end);

            let target = settings.cache.snapshot_target(s3_bucket, s3_key)?;

            match target {
                CacheLocation::File(path) => {
                    let path = Path::new(&path);
                    let mut document: CacheDocument = load_document_file(path)?;
                    refresh_document(&source, &countries, &range, &mut document).await;
                    write_document_file(path, &document)?;
                }
                CacheLocation::S3 { bucket, key } => {
                    let config = aws_config::load_from_env().await;
                    let s3 = aws_sdk_s3::Client::new(&config);
                    let store = S3Cache::new(s3.clone(), bucket.clone(), key.clone());

                    let mut document = store.load_document().await?.unwrap_or_default();
                    refresh_document(&source, &countries, &range, &mut document).await;
                    write_json_to_s3(&s3, &bucket, &key, &document).await?;
                }
            }
        }
    }

    Ok(())
}

/// Applies command-line overrides on top of environment settings.
fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(url) = &cli.api_url {
        settings.api_url = url.clone();
    }
    if let Some(secs) = cli.timeout_secs.filter(|s| *s > 0) {
        settings.fetch_timeout = Duration::from_secs(secs);
    }
    if let Some(path) = &cli.cache_path {
        settings.cache = CacheLocation::File(path.clone());
    }
    settings
}

/// Opens the configured cache store.
async fn open_cache(location: &CacheLocation) -> Box<dyn CacheStore> {
    match location {
        CacheLocation::File(path) => {
            info!(path = %path, "Using local cache document");
            Box::new(JsonFileCache::new(path))
        }
        CacheLocation::S3 { bucket, key } => {
            info!(bucket = %bucket, key = %key, "Using S3 cache document");
            let config = aws_config::load_from_env().await;
            Box::new(S3Cache::new(
                aws_sdk_s3::Client::new(&config),
                bucket.clone(),
                key.clone(),
            ))
        }
    }
}
