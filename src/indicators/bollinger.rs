// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ).  σ is the population standard deviation of
// the trailing window (divide by `period`, not `period - 1`).
//
// Every output index recomputes its full trailing window: O(n * period).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{DataPoint, Timestamp};

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_MULTIPLIER: f64 = 2.0;

/// Bands at one close.  All three are `None` inside the warm-up region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerPoint {
    pub date: Timestamp,
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
}

impl BollingerPoint {
    fn warm_up(date: Timestamp) -> Self {
        Self {
            date,
            upper: None,
            middle: None,
            lower: None,
        }
    }

    /// `upper - lower`, when defined.
    pub fn width(&self) -> Option<f64> {
        Some(self.upper? - self.lower?)
    }
}

/// Calculate Bollinger Bands for every close in `data`.
///
/// Returns an empty vec when `period == 0` or `data.len() < period`.
/// Otherwise the output has one point per input; indices `< period - 1`
/// are warm-up.
pub fn calculate_bollinger(data: &[DataPoint], period: usize, multiplier: f64) -> Vec<BollingerPoint> {
    if period == 0 || data.len() < period {
        debug!(points = data.len(), period, "Bollinger: insufficient data");
        return Vec::new();
    }

    let period_f = period as f64;

    data.iter()
        .enumerate()
        .map(|(i, point)| {
            if i + 1 < period {
                return BollingerPoint::warm_up(point.date);
            }

            let window = &data[i + 1 - period..=i];
            let middle = window.iter().map(|p| p.close).sum::<f64>() / period_f;
            let variance = window
                .iter()
                .map(|p| (p.close - middle).powi(2))
                .sum::<f64>()
                / period_f;
            let std_dev = variance.sqrt();

            BollingerPoint {
                date: point.date,
                upper: Some(middle + multiplier * std_dev),
                middle: Some(middle),
                lower: Some(middle - multiplier * std_dev),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> Vec<DataPoint> {
        let start = Timestamp::parse("2024-01-02").unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| DataPoint::new(start.plus_millis(i as i64 * 86_400_000), c))
            .collect()
    }

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let out = calculate_bollinger(&series(&closes), 20, 2.0);
        assert_eq!(out.len(), 20);
        let bb = out[19];
        assert!((bb.middle.unwrap() - 10.5).abs() < 1e-10);
        assert!(bb.upper.unwrap() > bb.middle.unwrap());
        assert!(bb.lower.unwrap() < bb.middle.unwrap());
        // Population σ of 1..=20 is sqrt((20^2 - 1) / 12).
        let sigma = (399.0_f64 / 12.0).sqrt();
        assert!((bb.width().unwrap() - 4.0 * sigma).abs() < 1e-10);
    }

    #[test]
    fn bollinger_insufficient_data() {
        assert!(calculate_bollinger(&series(&[1.0, 2.0, 3.0]), 20, 2.0).is_empty());
        assert!(calculate_bollinger(&series(&[1.0, 2.0, 3.0]), 0, 2.0).is_empty());
    }

    #[test]
    fn bollinger_warm_up_region() {
        let closes: Vec<f64> = (0..25).map(|x| 100.0 + (x % 3) as f64).collect();
        let out = calculate_bollinger(&series(&closes), 20, 2.0);
        assert_eq!(out.len(), 25);
        assert!(out[..19].iter().all(|p| p.middle.is_none() && p.width().is_none()));
        assert!(out[19].middle.is_some());
    }

    #[test]
    fn bollinger_flat_has_collapsed_bands() {
        let out = calculate_bollinger(&series(&[100.0; 20]), 20, 2.0);
        let bb = out[19];
        assert_eq!(bb.upper, bb.middle);
        assert_eq!(bb.middle, bb.lower);
        assert_eq!(bb.middle, Some(100.0));
    }

    #[test]
    fn bollinger_band_ordering() {
        let closes = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13, 43.80, 44.90, 45.01, 44.02, 43.55,
        ];
        for bb in calculate_bollinger(&series(&closes), 5, 2.0) {
            if let (Some(u), Some(m), Some(l)) = (bb.upper, bb.middle, bb.lower) {
                assert!(u >= m && m >= l, "bands out of order: {u} {m} {l}");
            }
        }
    }
}
