// =============================================================================
// Quote Lens — snapshot driver
// =============================================================================
//
// Reads one provider snapshot (JSON), runs the chart pipeline over it, and
// prints the report to stdout.  Logs go to stderr so the report stays pipeable.
//
// Snapshot shape:
//   { "symbol": "AAPL",
//     "intraday": [ { "date", "close", "volume"? }, ... ],   multi-day 1m window
//     "previousClose": 170.1,                               provider fallback
//     "daily": [ ... ],                                     ~1y of daily bars
//     "comparison": [ ... ],                                daily bars, 2nd symbol
//     "livePrice": 172.3 }
// Every field except "symbol" is optional.
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use quote_lens::market_data::{ensure_ordered, raw_quotes_from_value, to_data_points};
use quote_lens::{
    build_comparison_chart, build_intraday_chart, compute_performance, AnalyticsConfig, ComparisonChart,
    DataPoint, IntradayChart, StockPerformance,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    symbol: String,
    intraday: Option<IntradayChart>,
    performance: Option<StockPerformance>,
    comparison: Option<ComparisonChart>,
}

fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path =
        std::env::var("QUOTE_LENS_CONFIG").unwrap_or_else(|_| "analytics_config.json".into());
    let config = AnalyticsConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AnalyticsConfig::default()
    });

    // First run: write the defaults out so they can be edited.
    if !std::path::Path::new(&config_path).exists() {
        if let Err(e) = config.save(&config_path) {
            error!(error = %e, "Failed to save default config");
        }
    }

    // ── 2. Snapshot ──────────────────────────────────────────────────────
    let snapshot_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("QUOTE_LENS_SNAPSHOT").ok())
        .context("usage: quote-lens <snapshot.json> (or set QUOTE_LENS_SNAPSHOT)")?;

    let content = std::fs::read_to_string(&snapshot_path)
        .with_context(|| format!("failed to read snapshot from {snapshot_path}"))?;
    let root: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot from {snapshot_path}"))?;

    let symbol = root["symbol"]
        .as_str()
        .context("missing field symbol")?
        .to_uppercase();

    let intraday = series_field(&root, "intraday")?;
    let daily = series_field(&root, "daily")?;
    let comparison = series_field(&root, "comparison")?;
    let previous_close = root["previousClose"].as_f64().unwrap_or(0.0);
    let live_price = root["livePrice"].as_f64();

    info!(
        symbol = %symbol,
        intraday_points = intraday.as_ref().map_or(0, Vec::len),
        daily_points = daily.as_ref().map_or(0, Vec::len),
        comparison_points = comparison.as_ref().map_or(0, Vec::len),
        "snapshot loaded"
    );

    // ── 3. Pipeline ──────────────────────────────────────────────────────
    let intraday_chart = intraday
        .as_deref()
        .map(|points| build_intraday_chart(points, previous_close, &config));

    // A live price from the intraday session beats the last daily close.
    let current = live_price.or_else(|| intraday_chart.as_ref().and_then(|c| c.last_price));
    let performance = daily
        .as_deref()
        .and_then(|points| compute_performance(points, current, &config.lookbacks));

    let comparison_frame = match (daily.as_deref(), comparison.as_deref()) {
        (Some(primary), Some(other)) => Some(build_comparison_chart(primary, other, &config)),
        _ => None,
    };

    let report = Report {
        symbol,
        intraday: intraday_chart,
        performance,
        comparison: comparison_frame,
    };

    // ── 4. Output ────────────────────────────────────────────────────────
    let out = serde_json::to_string_pretty(&report).context("failed to serialise report")?;
    println!("{out}");

    info!("report written");
    Ok(())
}

/// Decode an optional quote array from the snapshot into a clean series.
fn series_field(root: &Value, name: &str) -> Result<Option<Vec<DataPoint>>> {
    let value = &root[name];
    if value.is_null() {
        return Ok(None);
    }

    let raw = raw_quotes_from_value(value).with_context(|| format!("invalid {name} series"))?;
    let points = to_data_points(&raw);
    ensure_ordered(&points).with_context(|| format!("invalid {name} series"))?;

    Ok(Some(points))
}
