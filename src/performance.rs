// =============================================================================
// Trailing-period performance
// =============================================================================
//
// Four deltas of the current price against reference closes:
//
//   1 Day   : the previous bar in the series (prior completed trading day)
//   5 Days  : calendar lookback, see `find_reference_ago`
//   1 Month : 30 calendar days
//   6 Months: 180 calendar days
//
// The 1-day reference is deliberately the previous bar rather than a
// calendar lookback.
//
// The current price may be a live override newer than the series itself.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{DataPoint, PerformanceMetric, StockPerformance};

fn default_five_day() -> i64 {
    5
}

fn default_one_month() -> i64 {
    30
}

fn default_six_month() -> i64 {
    180
}

/// Calendar-day lookbacks for the multi-day metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceLookbacks {
    #[serde(default = "default_five_day")]
    pub five_day: i64,
    #[serde(default = "default_one_month")]
    pub one_month: i64,
    #[serde(default = "default_six_month")]
    pub six_month: i64,
}

impl Default for PerformanceLookbacks {
    fn default() -> Self {
        Self {
            five_day: default_five_day(),
            one_month: default_one_month(),
            six_month: default_six_month(),
        }
    }
}

impl PerformanceMetric {
    /// Delta of `current` against `reference`.
    ///
    /// A zero or non-finite reference yields the all-zero metric instead of
    /// an infinite or NaN percentage.
    pub fn between(reference: f64, current: f64) -> Self {
        if reference == 0.0 || !reference.is_finite() {
            return Self::default();
        }
        let change = current - reference;
        Self {
            price: reference,
            change,
            percent: change / reference * 100.0,
        }
    }
}

impl StockPerformance {
    /// Re-measure every metric against a newer live price, keeping the
    /// stored reference prices.
    pub fn with_live_price(&self, live_price: f64) -> Self {
        Self {
            current_price: live_price,
            perf_1d: PerformanceMetric::between(self.perf_1d.price, live_price),
            perf_5d: PerformanceMetric::between(self.perf_5d.price, live_price),
            perf_1m: PerformanceMetric::between(self.perf_1m.price, live_price),
            perf_6m: PerformanceMetric::between(self.perf_6m.price, live_price),
        }
    }
}

/// Latest point at least `days_ago` calendar days before the series' last
/// point.
///
/// Scans backward from the end and returns the first point whose timestamp
/// is `<=` the target; falls back to the earliest point when the series is
/// shorter than the lookback, or when the lookback reaches past the
/// representable calendar.  `None` only for an empty series.
pub fn find_reference_ago(series: &[DataPoint], days_ago: i64) -> Option<&DataPoint> {
    let last = series.last()?;
    let Some(target) = last.date.checked_minus_days(days_ago) else {
        debug!(days_ago, "lookback out of calendar range, using earliest point");
        return series.first();
    };

    series
        .iter()
        .rev()
        .find(|p| p.date <= target)
        .or_else(|| series.first())
}

/// Compute the performance table for a daily `series`.
///
/// `live_price` overrides the last close as the current price when given.
/// Returns `None` for an empty series.
pub fn compute_performance(
    series: &[DataPoint],
    live_price: Option<f64>,
    lookbacks: &PerformanceLookbacks,
) -> Option<StockPerformance> {
    let last = series.last()?;
    let current_price = live_price.unwrap_or(last.close);

    let metric = |reference: Option<&DataPoint>| {
        reference
            .map(|p| PerformanceMetric::between(p.close, current_price))
            .unwrap_or_default()
    };

    let previous_bar = if series.len() >= 2 {
        series.get(series.len() - 2)
    } else {
        series.first()
    };

    let perf = StockPerformance {
        current_price,
        perf_1d: metric(previous_bar),
        perf_5d: metric(find_reference_ago(series, lookbacks.five_day)),
        perf_1m: metric(find_reference_ago(series, lookbacks.one_month)),
        perf_6m: metric(find_reference_ago(series, lookbacks.six_month)),
    };

    debug!(
        points = series.len(),
        current_price,
        live_override = live_price.is_some(),
        pct_1d = format!("{:.3}", perf.perf_1d.percent),
        pct_6m = format!("{:.3}", perf.perf_6m.percent),
        "performance computed"
    );

    Some(perf)
}

/// Intraday change of the current price against the previous close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionChange {
    pub change: f64,
    pub percent: f64,
}

/// Header change for the intraday chart.  Zero when there is no usable
/// previous close.
pub fn session_change(current_price: f64, previous_close: f64) -> SessionChange {
    let metric = PerformanceMetric::between(previous_close, current_price);
    SessionChange {
        change: metric.change,
        percent: metric.percent,
    }
}
