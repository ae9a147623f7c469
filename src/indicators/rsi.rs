// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1: Compute price changes (deltas) from consecutive closes.
// Step 2: Seed average gain / average loss with the simple average of the
//         first `period` gains / losses.
// Step 3: Apply Wilder's exponential smoothing:
//           avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//           avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4: RS  = avg_gain / avg_loss
//         RSI = 100 - 100 / (1 + RS), forced to 100 whenever avg_loss == 0.
//
// The output is aligned one-to-one with the input: the first `period` points
// are warm-up (`None`), the first defined value sits at `data[period]`.
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{DataPoint, Timestamp};

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// One RSI sample, keyed by the date of the close it was computed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiPoint {
    pub date: Timestamp,
    pub value: Option<f64>,
}

/// Overbought / oversold classification of an RSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn classify(value: f64) -> Self {
        if value >= 70.0 {
            Self::Overbought
        } else if value <= 30.0 {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Compute the full RSI series for `data` with look-back `period`.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `data.len() < period` => empty vec
/// - `data.len() == period` => `period` warm-up points, no defined value
///   (there are only `period - 1` deltas, not enough to seed)
/// - Average loss of zero forces RSI to exactly 100.0, including a flat series.
pub fn calculate_rsi(data: &[DataPoint], period: usize) -> Vec<RsiPoint> {
    if period == 0 || data.len() < period {
        debug!(points = data.len(), period, "RSI: insufficient data");
        return Vec::new();
    }

    let mut result: Vec<RsiPoint> = data[..period]
        .iter()
        .map(|p| RsiPoint {
            date: p.date,
            value: None,
        })
        .collect();

    if data.len() == period {
        return result;
    }
    result.reserve(data.len() - period);

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = data.windows(2).map(|w| w[1].close - w[0].close).collect();

    // --- Seed averages with the simple mean of the first `period` deltas -----
    let (sum_gain, sum_loss) = deltas[..period].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l + d.abs())
        }
    });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    result.push(RsiPoint {
        date: data[period].date,
        value: Some(rsi_from_averages(avg_gain, avg_loss)),
    });

    // --- Wilder's smoothing for subsequent values ----------------------------
    // deltas[i - 1] is the move from data[i - 1] to data[i].
    for (point, &delta) in data[period + 1..].iter().zip(&deltas[period..]) {
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        result.push(RsiPoint {
            date: point.date,
            value: Some(rsi_from_averages(avg_gain, avg_loss)),
        });
    }

    result
}

/// Most recent defined RSI value together with its zone.
///
/// Returns `None` when the series is empty or still entirely warm-up.
pub fn latest_rsi(points: &[RsiPoint]) -> Option<(f64, RsiZone)> {
    let value = points.iter().rev().find_map(|p| p.value)?;
    Some((value, RsiZone::classify(value)))
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: one point per minute starting at 14:30 UTC.
    fn series(closes: &[f64]) -> Vec<DataPoint> {
        let start = Timestamp::parse("2024-03-05T14:30:00Z").unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| DataPoint::new(start.plus_millis(i as i64 * 60_000), c))
            .collect()
    }

    fn ascending(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&series(&[1.0, 2.0, 3.0]), 0).is_empty());
    }

    #[test]
    fn rsi_insufficient_data() {
        assert!(calculate_rsi(&series(&ascending(13)), 14).is_empty());
    }

    #[test]
    fn rsi_exactly_period_points_is_all_warm_up() {
        let out = calculate_rsi(&series(&ascending(14)), 14);
        assert_eq!(out.len(), 14);
        assert!(out.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn rsi_length_and_warm_up() {
        let data = series(&ascending(30));
        let out = calculate_rsi(&data, 14);
        assert_eq!(out.len(), data.len());
        assert!(out[..14].iter().all(|p| p.value.is_none()));
        assert!(out[14..].iter().all(|p| p.value.is_some()));
        for (p, d) in out.iter().zip(&data) {
            assert_eq!(p.date, d.date);
        }
    }

    #[test]
    fn rsi_all_gains_forces_100() {
        let out = calculate_rsi(&series(&ascending(30)), 14);
        for v in out.iter().filter_map(|p| p.value) {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let out = calculate_rsi(&series(&closes), 14);
        for v in out.iter().filter_map(|p| p.value) {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_has_no_loss_and_reads_100() {
        let out = calculate_rsi(&series(&[100.0; 30]), 14);
        for v in out.iter().filter_map(|p| p.value) {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_single_late_loss_lands_between_50_and_100() {
        // 15 closes: 14 equal gains, then one loss.  The seed covers the 14
        // gains; the loss only enters through smoothing.
        let mut closes = ascending(15);
        closes.push(14.0);
        let out = calculate_rsi(&series(&closes), 14);

        let first = out[14].value.unwrap();
        assert!((first - 100.0).abs() < 1e-10);

        let last = out[15].value.unwrap();
        assert!(last > 50.0 && last < 100.0, "got {last}");
    }

    #[test]
    fn rsi_seed_including_a_loss_is_below_100() {
        // 15 points: 13 gains of +1 then a loss of -1 in the seed window.
        let mut closes = ascending(14);
        closes.push(13.0);
        let out = calculate_rsi(&series(&closes), 14);
        let first = out[14].value.unwrap();
        // avg_gain = 13/14, avg_loss = 1/14 => RS = 13 => RSI = 92.857...
        assert!((first - (100.0 - 100.0 / 14.0)).abs() < 1e-10);
        assert!(first > 50.0 && first < 100.0);
    }

    #[test]
    fn rsi_range_check() {
        let closes = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let out = calculate_rsi(&series(&closes), 14);
        assert_eq!(out.len(), closes.len());
        for v in out.iter().filter_map(|p| p.value) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_serialises_warm_up_as_null() {
        let out = calculate_rsi(&series(&ascending(16)), 14);
        let json = serde_json::to_value(&out).unwrap();
        assert!(json[0]["value"].is_null());
        assert_eq!(json[15]["value"], 100.0);
    }

    // ---- latest_rsi ------------------------------------------------------

    #[test]
    fn latest_rsi_overbought() {
        let out = calculate_rsi(&series(&ascending(30)), 14);
        let (val, zone) = latest_rsi(&out).unwrap();
        assert!((val - 100.0).abs() < 1e-10);
        assert_eq!(zone, RsiZone::Overbought);
        assert_eq!(zone.to_string(), "OVERBOUGHT");
    }

    #[test]
    fn latest_rsi_oversold() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let (_, zone) = latest_rsi(&calculate_rsi(&series(&closes), 14)).unwrap();
        assert_eq!(zone, RsiZone::Oversold);
    }

    #[test]
    fn latest_rsi_none_while_warming_up() {
        assert!(latest_rsi(&[]).is_none());
        assert!(latest_rsi(&calculate_rsi(&series(&ascending(14)), 14)).is_none());
    }

    #[test]
    fn zone_boundaries() {
        assert_eq!(RsiZone::classify(70.0), RsiZone::Overbought);
        assert_eq!(RsiZone::classify(30.0), RsiZone::Oversold);
        assert_eq!(RsiZone::classify(50.0), RsiZone::Neutral);
    }
}
