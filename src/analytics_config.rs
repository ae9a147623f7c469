// =============================================================================
// Analytics Configuration — indicator and chart settings with atomic save
// =============================================================================
//
// Every tunable parameter of the chart pipeline lives here: indicator
// periods, the gap-fill density, and the performance lookbacks.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::{
    DEFAULT_BOLLINGER_MULTIPLIER, DEFAULT_BOLLINGER_PERIOD, DEFAULT_RSI_PERIOD, DEFAULT_SMA_PERIODS,
};
use crate::market_data::DEFAULT_GAP_STEPS;
use crate::performance::PerformanceLookbacks;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_bollinger_period() -> usize {
    DEFAULT_BOLLINGER_PERIOD
}

fn default_bollinger_multiplier() -> f64 {
    DEFAULT_BOLLINGER_MULTIPLIER
}

fn default_sma_periods() -> Vec<usize> {
    DEFAULT_SMA_PERIODS.to_vec()
}

fn default_gap_steps() -> usize {
    DEFAULT_GAP_STEPS
}

fn default_domain_padding_pct() -> f64 {
    5.0
}

/// Longest accepted performance lookback (roughly a century of calendar days).
const MAX_LOOKBACK_DAYS: i64 = 36_500;

// =============================================================================
// AnalyticsConfig
// =============================================================================

/// Top-level configuration for the chart analytics pipeline.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    // --- Indicators ---------------------------------------------------------

    /// RSI look-back (Wilder).
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Bollinger window length.
    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    /// Bollinger band distance in standard deviations.
    #[serde(default = "default_bollinger_multiplier")]
    pub bollinger_multiplier: f64,

    /// SMA overlays drawn on the price chart.
    #[serde(default = "default_sma_periods")]
    pub sma_periods: Vec<usize>,

    #[serde(default = "default_true")]
    pub show_rsi: bool,

    #[serde(default = "default_true")]
    pub show_bollinger: bool,

    // --- Session / chart ----------------------------------------------------

    /// Synthetic points bridging the previous close into the session.
    #[serde(default = "default_gap_steps")]
    pub gap_steps: usize,

    /// Vertical padding added above and below the plotted range, in percent
    /// of the range (e.g. 5.0 means 5 %).
    #[serde(default = "default_domain_padding_pct")]
    pub domain_padding_pct: f64,

    // --- Performance --------------------------------------------------------

    #[serde(default)]
    pub lookbacks: PerformanceLookbacks,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            bollinger_period: default_bollinger_period(),
            bollinger_multiplier: default_bollinger_multiplier(),
            sma_periods: default_sma_periods(),
            show_rsi: true,
            show_bollinger: true,
            gap_steps: default_gap_steps(),
            domain_padding_pct: default_domain_padding_pct(),
            lookbacks: PerformanceLookbacks::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analytics config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analytics config from {}", path.display()))?;

        info!(
            path = %path.display(),
            rsi_period = config.rsi_period,
            bollinger_period = config.bollinger_period,
            sma_periods = ?config.sma_periods,
            "analytics config loaded"
        );

        Ok(config.validated())
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise analytics config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "analytics config saved (atomic)");
        Ok(())
    }

    /// Replace nonsensical values with their defaults.
    pub fn validated(mut self) -> Self {
        if self.rsi_period == 0 {
            warn!("rsi_period must be >= 1, using default");
            self.rsi_period = default_rsi_period();
        }
        if self.bollinger_period == 0 {
            warn!("bollinger_period must be >= 1, using default");
            self.bollinger_period = default_bollinger_period();
        }
        if !self.bollinger_multiplier.is_finite() || self.bollinger_multiplier < 0.0 {
            warn!(value = self.bollinger_multiplier, "bollinger_multiplier must be >= 0, using default");
            self.bollinger_multiplier = default_bollinger_multiplier();
        }
        if self.sma_periods.contains(&0) {
            warn!(periods = ?self.sma_periods, "dropping zero SMA period");
            self.sma_periods.retain(|&p| p > 0);
        }
        if !self.domain_padding_pct.is_finite() || self.domain_padding_pct < 0.0 {
            warn!(value = self.domain_padding_pct, "domain_padding_pct must be >= 0, using default");
            self.domain_padding_pct = default_domain_padding_pct();
        }

        let defaults = PerformanceLookbacks::default();
        for (name, value, fallback) in [
            ("five_day", &mut self.lookbacks.five_day, defaults.five_day),
            ("one_month", &mut self.lookbacks.one_month, defaults.one_month),
            ("six_month", &mut self.lookbacks.six_month, defaults.six_month),
        ] {
            if !(1..=MAX_LOOKBACK_DAYS).contains(&*value) {
                warn!(
                    lookback = name,
                    value = *value,
                    max = MAX_LOOKBACK_DAYS,
                    "lookback out of range, using default"
                );
                *value = fallback;
            }
        }
        self
    }
}
