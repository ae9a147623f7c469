// =============================================================================
// Provider quote adapter
// =============================================================================
//
// Upstream payloads are loosely typed: closes arrive as numbers, numeric
// strings, or null for minutes with no trade.  This is the one place such
// payloads are validated and turned into clean `DataPoint` sequences; the
// rest of the crate assumes every close is a usable number.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::types::{DataPoint, Timestamp};

/// A quote exactly as the provider sent it, before filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    pub date: Timestamp,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Parse a JSON array of provider quotes.
///
/// Expected shape:
/// ```json
/// [ { "date": "2024-03-05T14:30:00.000Z", "close": 101.2, "volume": 1200 }, ... ]
/// ```
pub fn parse_raw_quotes(text: &str) -> Result<Vec<RawQuote>> {
    let root: Value = serde_json::from_str(text).context("failed to parse quote JSON")?;
    raw_quotes_from_value(&root)
}

/// Same as [`parse_raw_quotes`] for an already-decoded JSON value.
pub fn raw_quotes_from_value(root: &Value) -> Result<Vec<RawQuote>> {
    let items = root.as_array().context("quote payload is not a JSON array")?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_raw_quote(item).with_context(|| format!("bad quote at index {i}")))
        .collect()
}

/// Parse a single provider quote object.
pub fn parse_raw_quote(item: &Value) -> Result<RawQuote> {
    let date = item["date"].as_str().context("missing field date")?;
    let date = Timestamp::parse(date)?;

    let close = parse_optional_f64(&item["close"], "close")?;
    let volume = parse_optional_f64(&item["volume"], "volume")?;

    Ok(RawQuote {
        date,
        close,
        volume,
    })
}

/// Keep only quotes with a usable close.
///
/// A close that is missing, non-finite, or exactly zero is treated as "no
/// trade" and the quote is dropped.
pub fn to_data_points(raw: &[RawQuote]) -> Vec<DataPoint> {
    let points: Vec<DataPoint> = raw
        .iter()
        .filter_map(|q| {
            let close = q.close.filter(|c| c.is_finite() && *c != 0.0)?;
            Some(DataPoint {
                date: q.date,
                close,
                volume: q.volume.filter(|v| v.is_finite()),
            })
        })
        .collect();

    let dropped = raw.len() - points.len();
    if dropped > 0 {
        debug!(dropped, kept = points.len(), "dropped quotes without a usable close");
    }

    points
}

/// Check that timestamps are strictly ascending (sorted, no duplicates).
pub fn ensure_ordered(points: &[DataPoint]) -> Result<()> {
    for (i, pair) in points.windows(2).enumerate() {
        if pair[0].date >= pair[1].date {
            anyhow::bail!(
                "series not strictly ascending at index {}: {} then {}",
                i + 1,
                pair[0].date,
                pair[1].date
            );
        }
    }
    Ok(())
}

/// Helper: providers send numeric values either as JSON numbers or strings.
fn parse_optional_f64(val: &Value, name: &str) -> Result<Option<f64>> {
    match val {
        Value::Null => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("failed to parse {name} as f64: {s}")),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .with_context(|| format!("field {name} is not a valid f64")),
        _ => anyhow::bail!("field {name} has unexpected JSON type"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mixed_payload() {
        let json = r#"[
            { "date": "2024-03-05T14:30:00.000Z", "close": 101.5, "volume": 1200 },
            { "date": "2024-03-05T14:31:00.000Z", "close": "101.75" },
            { "date": "2024-03-05T14:32:00.000Z", "close": null, "volume": null }
        ]"#;
        let raw = parse_raw_quotes(json).expect("should parse");
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0].volume, Some(1200.0));
        assert_eq!(raw[1].close, Some(101.75));
        assert_eq!(raw[2].close, None);
    }

    #[test]
    fn parse_rejects_non_array() {
        assert!(parse_raw_quotes(r#"{ "date": "2024-03-05" }"#).is_err());
    }

    #[test]
    fn parse_rejects_bad_types() {
        let err = parse_raw_quotes(r#"[ { "date": "2024-03-05", "close": true } ]"#).unwrap_err();
        assert!(format!("{err:#}").contains("index 0"));
        assert!(parse_raw_quotes(r#"[ { "close": 1.0 } ]"#).is_err());
        assert!(parse_raw_quotes(r#"[ { "date": "not a date", "close": 1.0 } ]"#).is_err());
    }

    #[test]
    fn filter_drops_missing_and_zero_closes() {
        let ts = |s: &str| Timestamp::parse(s).unwrap();
        let raw = vec![
            RawQuote { date: ts("2024-03-05T14:30:00Z"), close: Some(10.0), volume: Some(5.0) },
            RawQuote { date: ts("2024-03-05T14:31:00Z"), close: None, volume: Some(5.0) },
            RawQuote { date: ts("2024-03-05T14:32:00Z"), close: Some(0.0), volume: None },
            RawQuote { date: ts("2024-03-05T14:33:00Z"), close: Some(f64::NAN), volume: None },
            RawQuote { date: ts("2024-03-05T14:34:00Z"), close: Some(11.0), volume: None },
        ];
        let points = to_data_points(&raw);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].volume, Some(5.0));
        assert!((points[1].close - 11.0).abs() < 1e-10);
    }

    #[test]
    fn ordering_check() {
        let p = |s: &str| DataPoint::new(Timestamp::parse(s).unwrap(), 1.0);
        assert!(ensure_ordered(&[]).is_ok());
        assert!(ensure_ordered(&[p("2024-03-05"), p("2024-03-06")]).is_ok());
        assert!(ensure_ordered(&[p("2024-03-06"), p("2024-03-05")]).is_err());
        assert!(ensure_ordered(&[p("2024-03-05"), p("2024-03-05")]).is_err());
    }
}
