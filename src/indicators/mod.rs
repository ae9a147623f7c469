// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the chart overlays.  Every
// function returns a series aligned one-to-one with its input, with `None`
// marking the warm-up region, or an empty series when the input is too short.
// None of them ever return an error.

pub mod bollinger;
pub mod rsi;
pub mod sma;

pub use bollinger::{calculate_bollinger, BollingerPoint, DEFAULT_BOLLINGER_MULTIPLIER, DEFAULT_BOLLINGER_PERIOD};
pub use rsi::{calculate_rsi, latest_rsi, RsiPoint, RsiZone, DEFAULT_RSI_PERIOD};
pub use sma::{calculate_sma, SmaPoint, DEFAULT_SMA_PERIODS};
