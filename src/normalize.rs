// =============================================================================
// Series normalization for comparison overlays
// =============================================================================
//
// Two instruments of different absolute price only overlay meaningfully on a
// common scale.  Each series is re-expressed as percent change from its own
// first close, so the left edge of the window is the zero line for both:
//
//   percent = (close - base) / base * 100
//
// The comparison series is joined onto the primary by calendar day.  A day
// present in the primary but missing from the comparison gets no comparison
// value; there is no interpolation or nearest-day matching.
//
// Indicators computed in price space (SMA, Bollinger) are rebased with the
// primary's base so they stay on the percent scale.  RSI is already a bounded
// oscillator and is never rebased.
// =============================================================================

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::indicators::{BollingerPoint, SmaPoint};
use crate::types::{DataPoint, DateKey};

/// A primary point with its position on the percent scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPoint {
    #[serde(flatten)]
    pub point: DataPoint,
    pub percent_value: f64,
    pub comparison_percent_value: Option<f64>,
}

/// Percent change of `value` from `base`.  A zero base maps everything to 0.
pub fn percent_change(value: f64, base: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    (value - base) / base * 100.0
}

/// Rebases price-space values onto one series' percent scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    pub base: f64,
}

impl Normalizer {
    /// Normalizer anchored at the first close of `series`, if any.
    pub fn for_series(series: &[DataPoint]) -> Option<Self> {
        series.first().map(|p| Self { base: p.close })
    }

    pub fn percent(&self, value: f64) -> f64 {
        percent_change(value, self.base)
    }

    /// Rebase an optional indicator value; warm-up stays warm-up.
    pub fn renormalize(&self, value: Option<f64>) -> Option<f64> {
        value.map(|v| self.percent(v))
    }

    pub fn rebase_sma(&self, points: &[SmaPoint]) -> Vec<SmaPoint> {
        points
            .iter()
            .map(|p| SmaPoint {
                date: p.date,
                value: self.renormalize(p.value),
            })
            .collect()
    }

    pub fn rebase_bollinger(&self, points: &[BollingerPoint]) -> Vec<BollingerPoint> {
        points
            .iter()
            .map(|p| BollingerPoint {
                date: p.date,
                upper: self.renormalize(p.upper),
                middle: self.renormalize(p.middle),
                lower: self.renormalize(p.lower),
            })
            .collect()
    }
}

/// Day-keyed closes of a comparison series.  A later point on the same day
/// replaces an earlier one.
pub fn closes_by_day(series: &[DataPoint]) -> HashMap<DateKey, f64> {
    series.iter().map(|p| (p.date_key(), p.close)).collect()
}

/// Rescale `primary` (and optionally `comparison`) to percent change from
/// their respective first closes.
pub fn normalize_series(primary: &[DataPoint], comparison: Option<&[DataPoint]>) -> Vec<NormalizedPoint> {
    let Some(main) = Normalizer::for_series(primary) else {
        return Vec::new();
    };

    let comparison = comparison.and_then(|c| Normalizer::for_series(c).map(|n| (n, closes_by_day(c))));

    let normalized: Vec<NormalizedPoint> = primary
        .iter()
        .map(|p| NormalizedPoint {
            point: p.clone(),
            percent_value: main.percent(p.close),
            comparison_percent_value: comparison
                .as_ref()
                .and_then(|(norm, by_day)| by_day.get(&p.date_key()).map(|&c| norm.percent(c))),
        })
        .collect();

    if let Some((_, by_day)) = &comparison {
        let matched = normalized
            .iter()
            .filter(|p| p.comparison_percent_value.is_some())
            .count();
        debug!(
            primary_points = primary.len(),
            comparison_days = by_day.len(),
            matched,
            "comparison series joined by day"
        );
    }

    normalized
}
