// =============================================================================
// Gap-fill bridge between sessions
// =============================================================================
//
// A chart draws straight lines between samples, so a single segment from the
// previous close to today's first print would suggest trading through the
// closed period.  Instead the previous close is held flat across `steps`
// evenly spaced synthetic points:
//
//   Δ      = (t1 - t0) / (steps + 1)
//   t_k    = t0 + k·Δ            for k = 1..=steps
//   close  = previous close      (no interpolation toward the open)
//
// Offsets are computed in integer nanoseconds.  When the gap is too narrow to
// hold `steps` distinct instants (fewer than `steps + 1` ns) only as many
// points as fit are produced, so the bridge never repeats a timestamp.
//
// The bridged series is [anchor, synthetic..., real...], so real data starts
// at index `gap_count`.
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::types::{DataPoint, SessionResult};

pub const DEFAULT_GAP_STEPS: usize = 20;

/// Synthetic flat points strictly between `anchor` and `first_real`.
///
/// At most `steps` points, strictly increasing.  Returns an empty vec when
/// `steps == 0` or `first_real` is not after `anchor`.
pub fn gap_fill_points(anchor: &DataPoint, first_real: &DataPoint, steps: usize) -> Vec<DataPoint> {
    let span = first_real.date.nanos_since(&anchor.date);
    if steps == 0 || span <= 1 {
        return Vec::new();
    }

    let fitting = (steps as i128).min(span - 1);
    if fitting < steps as i128 {
        debug!(steps, fitting = fitting as u64, span_ns = span as i64, "gap narrower than requested steps");
    }

    let divisions = fitting + 1;
    (1..=fitting)
        .filter_map(|k| anchor.date.checked_plus_nanos(span * k / divisions))
        .map(|date| DataPoint::new(date, anchor.close))
        .collect()
}

/// A session series with the previous-close bridge prepended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapFilled {
    pub points: Vec<DataPoint>,
    /// Number of leading points that are not real quotes (anchor included).
    pub gap_count: usize,
}

impl GapFilled {
    /// The real quotes, without the bridge.
    pub fn real_points(&self) -> &[DataPoint] {
        &self.points[self.gap_count..]
    }

    /// Share of the series taken by the bridge, in percent.  The renderer
    /// uses this to switch stroke style where real data begins.
    pub fn gap_fraction(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.gap_count as f64 / self.points.len() as f64 * 100.0
    }
}

/// Prepend the previous-close anchor and `steps` flat points to a session.
///
/// The bridge is only built when the session has data and the previous
/// close came from the window itself (it carries a timestamp) and is
/// non-zero.  Otherwise the session data is returned unchanged.
pub fn bridge_session(session: &SessionResult, steps: usize) -> GapFilled {
    let (Some(first), Some(prev_date)) = (session.data.first(), session.previous_close_date) else {
        return GapFilled {
            points: session.data.clone(),
            gap_count: 0,
        };
    };
    if session.previous_close == 0.0 {
        return GapFilled {
            points: session.data.clone(),
            gap_count: 0,
        };
    }

    let anchor = DataPoint::new(prev_date, session.previous_close);
    let synthetic = gap_fill_points(&anchor, first, steps);
    let synthetic_len = synthetic.len();

    let mut points = Vec::with_capacity(1 + synthetic.len() + session.data.len());
    points.push(anchor);
    points.extend(synthetic);
    points.extend(session.data.iter().cloned());

    let gap_count = 1 + synthetic_len;
    debug!(steps, gap_count, real_points = session.data.len(), "previous-close bridge prepended");

    GapFilled { points, gap_count }
}
