// =============================================================================
// Chart assembly
// =============================================================================
//
// Joins a price series with its overlays into one row per point, the shape
// the renderer consumes:
//
//   date, value, originalClose, comparisonValue, sma[], rsi,
//   bbUpper, bbMiddle, bbLower
//
// In comparison mode `value`, the SMAs and the Bollinger bands are rebased
// onto the primary's percent scale and `comparisonValue` carries the joined
// second series.  RSI always stays on its own 0..100 scale.
//
// Each call is a full recomputation from the given snapshot.
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::analytics_config::AnalyticsConfig;
use crate::indicators::{calculate_bollinger, calculate_rsi, calculate_sma, BollingerPoint, SmaPoint};
use crate::market_data::{bridge_session, segment_session};
use crate::normalize::{normalize_series, Normalizer};
use crate::performance::{session_change, SessionChange};
use crate::types::{DataPoint, Timestamp};

/// Which overlays to compute and with which parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub sma_periods: Vec<usize>,
    pub show_rsi: bool,
    pub show_bollinger: bool,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
}

impl From<&AnalyticsConfig> for ChartOptions {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            sma_periods: config.sma_periods.clone(),
            show_rsi: config.show_rsi,
            show_bollinger: config.show_bollinger,
            rsi_period: config.rsi_period,
            bollinger_period: config.bollinger_period,
            bollinger_multiplier: config.bollinger_multiplier,
        }
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::from(&AnalyticsConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmaValue {
    pub period: usize,
    pub value: Option<f64>,
}

/// One plotted sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    pub date: Timestamp,
    /// Close, or percent change from the first close in comparison mode.
    pub value: f64,
    pub original_close: f64,
    pub comparison_value: Option<f64>,
    pub sma: Vec<SmaValue>,
    pub rsi: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartFrame {
    pub rows: Vec<ChartRow>,
    pub comparison_mode: bool,
}

impl ChartFrame {
    /// Min/max over the plotted lines (`value` and `comparisonValue`), each
    /// side widened by `padding_fraction` of the span.
    pub fn value_range(&self, padding_fraction: f64) -> Option<(f64, f64)> {
        let mut values = self
            .rows
            .iter()
            .flat_map(|r| std::iter::once(r.value).chain(r.comparison_value));

        let first = values.next()?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let padding = (max - min) * padding_fraction;

        Some((min - padding, max + padding))
    }
}

/// Build chart rows for `points`, optionally overlaid with `comparison`.
pub fn assemble_chart(points: &[DataPoint], comparison: Option<&[DataPoint]>, options: &ChartOptions) -> ChartFrame {
    if points.is_empty() {
        return ChartFrame::default();
    }

    let comparison = comparison.filter(|c| !c.is_empty());
    // Only rebase when a comparison series is actually present.
    let rebase = comparison.and(Normalizer::for_series(points));

    let rsi = if options.show_rsi {
        calculate_rsi(points, options.rsi_period)
    } else {
        Vec::new()
    };

    let mut bands = if options.show_bollinger {
        calculate_bollinger(points, options.bollinger_period, options.bollinger_multiplier)
    } else {
        Vec::new()
    };

    let mut smas: Vec<(usize, Vec<SmaPoint>)> = options
        .sma_periods
        .iter()
        .map(|&period| (period, calculate_sma(points, period)))
        .collect();

    if let Some(norm) = &rebase {
        bands = norm.rebase_bollinger(&bands);
        for (_, series) in &mut smas {
            *series = norm.rebase_sma(series);
        }
    }

    let normalized = rebase.map(|_| normalize_series(points, comparison));

    // Every overlay is index-aligned with `points` (or empty when too short).
    let rows: Vec<ChartRow> = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let band: Option<&BollingerPoint> = bands.get(i);
            let (value, comparison_value) = match &normalized {
                Some(n) => (n[i].percent_value, n[i].comparison_percent_value),
                None => (point.close, None),
            };

            ChartRow {
                date: point.date,
                value,
                original_close: point.close,
                comparison_value,
                sma: smas
                    .iter()
                    .map(|(period, series)| SmaValue {
                        period: *period,
                        value: series.get(i).and_then(|p| p.value),
                    })
                    .collect(),
                rsi: rsi.get(i).and_then(|p| p.value),
                bb_upper: band.and_then(|b| b.upper),
                bb_middle: band.and_then(|b| b.middle),
                bb_lower: band.and_then(|b| b.lower),
            }
        })
        .collect();

    debug!(
        rows = rows.len(),
        comparison_mode = normalized.is_some(),
        sma_overlays = smas.len(),
        "chart assembled"
    );

    ChartFrame {
        rows,
        comparison_mode: normalized.is_some(),
    }
}

// =============================================================================
// Intraday pipeline
// =============================================================================

/// Everything the intraday chart needs from one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntradayChart {
    pub frame: ChartFrame,
    /// Leading rows that are the previous-close bridge, not real quotes.
    pub gap_count: usize,
    pub previous_close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close_date: Option<Timestamp>,
    pub last_price: Option<f64>,
    pub change: SessionChange,
    /// Padded y-axis range over the plotted values, `None` when empty.
    pub value_range: Option<(f64, f64)>,
}

/// Segment a multi-day 1-minute window, bridge the gap from the previous
/// close, and assemble the chart.
pub fn build_intraday_chart(
    points: &[DataPoint],
    fallback_previous_close: f64,
    config: &AnalyticsConfig,
) -> IntradayChart {
    let session = segment_session(points, fallback_previous_close);
    let bridged = bridge_session(&session, config.gap_steps);
    let frame = assemble_chart(&bridged.points, None, &ChartOptions::from(config));
    let value_range = frame.value_range(config.domain_padding_pct / 100.0);

    let last_price = session.data.last().map(|p| p.close);
    let change = last_price
        .map(|price| session_change(price, session.previous_close))
        .unwrap_or_default();

    IntradayChart {
        frame,
        gap_count: bridged.gap_count,
        previous_close: session.previous_close,
        previous_close_date: session.previous_close_date,
        last_price,
        change,
        value_range,
    }
}

/// Daily chart of one symbol overlaid with a second, on the percent scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonChart {
    pub frame: ChartFrame,
    pub value_range: Option<(f64, f64)>,
}

/// Assemble the comparison overlay of `primary` and `comparison` with the
/// configured overlays and axis padding.
pub fn build_comparison_chart(
    primary: &[DataPoint],
    comparison: &[DataPoint],
    config: &AnalyticsConfig,
) -> ComparisonChart {
    let frame = assemble_chart(primary, Some(comparison), &ChartOptions::from(config));
    let value_range = frame.value_range(config.domain_padding_pct / 100.0);
    ComparisonChart { frame, value_range }
}
