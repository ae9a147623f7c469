// =============================================================================
// Session segmentation
// =============================================================================
//
// The provider bundles several trailing calendar days of 1-minute quotes so
// that the latest session is always covered.  The latest session is simply
// every point sharing the calendar day of the *last* point; anything earlier
// is prior history whose final close becomes the previous close.
//
// Only the relative ordering of the input is used, never wall-clock "now".

use tracing::debug;

use crate::types::{DataPoint, SessionResult};

/// Split `points` into the latest session and derive its previous close.
///
/// `fallback_previous_close` is the provider-supplied value used when the
/// window holds no earlier day (single-day or empty input).
pub fn segment_session(points: &[DataPoint], fallback_previous_close: f64) -> SessionResult {
    let Some(last) = points.last() else {
        debug!("session: empty input, using fallback previous close");
        return SessionResult {
            data: Vec::new(),
            previous_close: fallback_previous_close,
            previous_close_date: None,
        };
    };

    let last_key = last.date_key();
    let (current, prior): (Vec<&DataPoint>, Vec<&DataPoint>) =
        points.iter().partition(|p| p.date_key() == last_key);

    let data: Vec<DataPoint> = current.into_iter().cloned().collect();

    match prior.last() {
        Some(prev) => {
            debug!(
                session_day = %last_key,
                session_points = data.len(),
                prior_points = prior.len(),
                previous_close = prev.close,
                "session segmented"
            );
            SessionResult {
                data,
                previous_close: prev.close,
                previous_close_date: Some(prev.date),
            }
        }
        None => {
            debug!(
                session_day = %last_key,
                session_points = data.len(),
                fallback_previous_close,
                "session: no prior day in window, using fallback previous close"
            );
            SessionResult {
                data,
                previous_close: fallback_previous_close,
                previous_close_date: None,
            }
        }
    }
}

/// Split `points` into maximal runs sharing one calendar-day key.
pub fn split_sessions(points: &[DataPoint]) -> Vec<&[DataPoint]> {
    points
        .chunk_by(|a, b| a.date_key() == b.date_key())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    fn point(date: &str, close: f64) -> DataPoint {
        DataPoint::new(Timestamp::parse(date).unwrap(), close)
    }

    fn two_day_window() -> Vec<DataPoint> {
        vec![
            point("2024-03-04T14:30:00Z", 100.0),
            point("2024-03-04T20:59:00Z", 101.0),
            point("2024-03-05T14:30:00Z", 102.0),
            point("2024-03-05T14:31:00Z", 103.0),
        ]
    }

    #[test]
    fn empty_input_uses_fallback() {
        let result = segment_session(&[], 55.0);
        assert!(result.data.is_empty());
        assert!((result.previous_close - 55.0).abs() < 1e-10);
        assert_eq!(result.previous_close_date, None);
    }

    #[test]
    fn single_day_uses_fallback() {
        let points = vec![
            point("2024-03-05T14:30:00Z", 102.0),
            point("2024-03-05T14:31:00Z", 103.0),
        ];
        let result = segment_session(&points, 99.5);
        assert_eq!(result.data, points);
        assert!((result.previous_close - 99.5).abs() < 1e-10);
        assert_eq!(result.previous_close_date, None);
    }

    #[test]
    fn two_days_take_last_close_of_day_one() {
        let points = two_day_window();
        let result = segment_session(&points, 0.0);
        assert_eq!(result.data, points[2..].to_vec());
        assert!((result.previous_close - 101.0).abs() < 1e-10);
        assert_eq!(result.previous_close_date, Some(points[1].date));
    }

    #[test]
    fn many_bundled_days_only_latest_counts() {
        let points = vec![
            point("2024-02-29T20:59:00Z", 90.0),
            point("2024-03-01T20:59:00Z", 95.0),
            point("2024-03-04T20:59:00Z", 98.0),
            point("2024-03-05T14:30:00Z", 102.0),
        ];
        let result = segment_session(&points, 0.0);
        assert_eq!(result.data.len(), 1);
        assert!((result.previous_close - 98.0).abs() < 1e-10);
    }

    #[test]
    fn day_key_follows_recorded_offset() {
        // 19:00 at -05:00 is 00:00 UTC next day; still the same local session.
        let points = vec![
            point("2024-03-04T15:59:00-05:00", 100.0),
            point("2024-03-05T09:30:00-05:00", 101.0),
            point("2024-03-05T19:00:00-05:00", 102.0),
        ];
        let result = segment_session(&points, 0.0);
        assert_eq!(result.data.len(), 2);
        assert!((result.previous_close - 100.0).abs() < 1e-10);
    }

    #[test]
    fn split_sessions_groups_by_day() {
        let points = two_day_window();
        let sessions = split_sessions(&points);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].len(), 2);
        assert_eq!(sessions[1].len(), 2);
        assert!(split_sessions(&[]).is_empty());
    }
}
