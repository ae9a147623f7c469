// =============================================================================
// Shared series types used across the analytics core
// =============================================================================

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, SecondsFormat, TimeZone};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Calendar-day key used for every day-based grouping and join.
pub type DateKey = NaiveDate;

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// An instant together with the UTC offset it was recorded in.
///
/// Accepts full RFC 3339 strings (`2024-03-05T14:30:00.000Z`) as well as bare
/// dates (`2024-03-05`, read as midnight UTC) because daily history from the
/// provider carries no time component.  Always serialises as RFC 3339 with
/// millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    pub fn new(inner: DateTime<FixedOffset>) -> Self {
        Self(inner)
    }

    /// Parse an ISO-8601 timestamp or bare calendar date.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self(dt));
        }

        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .with_context(|| format!("invalid ISO-8601 timestamp: {text:?}"))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .with_context(|| format!("no midnight for date {date}"))?;
        let utc = FixedOffset::east_opt(0).context("zero UTC offset out of range")?;

        Ok(Self(utc.from_utc_datetime(&midnight)))
    }

    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Truncate to the calendar day in the timestamp's own offset.  No
    /// timezone conversion is performed.
    pub fn date_key(&self) -> DateKey {
        self.0.date_naive()
    }

    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0 + Duration::milliseconds(millis))
    }

    /// Nanoseconds elapsed from `earlier` to `self` (negative if `earlier`
    /// is actually later).  Widened to `i128` so any two instants fit.
    pub fn nanos_since(&self, earlier: &Timestamp) -> i128 {
        let delta = self.0 - earlier.0;
        i128::from(delta.num_seconds()) * 1_000_000_000 + i128::from(delta.subsec_nanos())
    }

    /// Step forward `nanos` nanoseconds.  `None` when the result leaves the
    /// representable range.
    pub fn checked_plus_nanos(&self, nanos: i128) -> Option<Self> {
        let secs = i64::try_from(nanos.div_euclid(1_000_000_000)).ok()?;
        let subsec = nanos.rem_euclid(1_000_000_000) as i64;
        let delta = Duration::try_seconds(secs)?.checked_add(&Duration::nanoseconds(subsec))?;
        self.0.checked_add_signed(delta).map(Self)
    }

    /// Step back `days` calendar days, keeping the wall-clock time.  `None`
    /// when the result leaves the representable range.
    pub fn checked_minus_days(&self, days: i64) -> Option<Self> {
        let delta = Duration::try_days(days)?;
        self.0.checked_sub_signed(delta).map(Self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl FromStr for Timestamp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(|e| de::Error::custom(format!("{e:#}")))
    }
}

// ---------------------------------------------------------------------------
// DataPoint
// ---------------------------------------------------------------------------

/// A single close (and optional volume) observation.
///
/// Sequences of points are ascending by `date` with no duplicate timestamps.
/// Nothing in the core mutates an input sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: Timestamp,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl DataPoint {
    pub fn new(date: Timestamp, close: f64) -> Self {
        Self {
            date,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn date_key(&self) -> DateKey {
        self.date.date_key()
    }
}

// ---------------------------------------------------------------------------
// SessionResult
// ---------------------------------------------------------------------------

/// The latest intraday session plus the close it should be measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    /// Points of the most recent calendar day, in input order.
    pub data: Vec<DataPoint>,
    /// Close of the last earlier-day point, or the provider fallback.
    pub previous_close: f64,
    /// Timestamp of that earlier-day point; `None` when the fallback was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_close_date: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

/// Price delta of the current price against one reference price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    /// Reference (historical) price.
    pub price: f64,
    /// `current - price`.
    pub change: f64,
    /// `change / price * 100`.
    pub percent: f64,
}

/// Trailing-period performance table for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPerformance {
    pub current_price: f64,
    #[serde(rename = "perf1d")]
    pub perf_1d: PerformanceMetric,
    #[serde(rename = "perf5d")]
    pub perf_5d: PerformanceMetric,
    #[serde(rename = "perf1m")]
    pub perf_1m: PerformanceMetric,
    #[serde(rename = "perf6m")]
    pub perf_6m: PerformanceMetric,
}
