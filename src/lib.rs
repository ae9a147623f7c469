// =============================================================================
// Quote Lens — chart analytics over ordered quote series
// =============================================================================
//
// Pure computation only: every entry point takes an already-fetched,
// ascending series and returns freshly built output.  Fetching, persistence
// and rendering belong to the caller.
// =============================================================================

pub mod analytics_config;
pub mod chart;
pub mod indicators;
pub mod market_data;
pub mod normalize;
pub mod performance;
pub mod types;

pub use analytics_config::AnalyticsConfig;
pub use chart::{
    assemble_chart, build_comparison_chart, build_intraday_chart, ChartFrame, ChartOptions, ChartRow,
    ComparisonChart, IntradayChart,
};
pub use normalize::{normalize_series, NormalizedPoint};
pub use performance::{compute_performance, find_reference_ago, PerformanceLookbacks};
pub use types::{DataPoint, DateKey, PerformanceMetric, SessionResult, StockPerformance, Timestamp};
