// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean of the trailing `period` closes ending at each index:
//
//   SMA_i = (close_{i-period+1} + ... + close_i) / period
//
// Indices `< period - 1` have no full window and are warm-up (`None`).
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::{DataPoint, Timestamp};

/// Periods overlaid on the chart by default (SMA 5 / 10 / 20).
pub const DEFAULT_SMA_PERIODS: [usize; 3] = [5, 10, 20];

/// One SMA sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmaPoint {
    pub date: Timestamp,
    pub value: Option<f64>,
}

/// Compute the SMA series for `data` and look-back `period`.
///
/// The output always has one point per input (all warm-up when the input is
/// shorter than `period`), except that `period == 0` yields an empty vec.
pub fn calculate_sma(data: &[DataPoint], period: usize) -> Vec<SmaPoint> {
    if period == 0 {
        return Vec::new();
    }

    let period_f = period as f64;

    data.iter()
        .enumerate()
        .map(|(i, point)| {
            let value = if i + 1 < period {
                None
            } else {
                Some(data[i + 1 - period..=i].iter().map(|p| p.close).sum::<f64>() / period_f)
            };
            SmaPoint {
                date: point.date,
                value,
            }
        })
        .collect()
}
