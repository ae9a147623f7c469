pub mod gap_fill;
pub mod quote;
pub mod session;

// Re-export the session entry points for convenient access (e.g. `use crate::market_data::segment_session`).
pub use gap_fill::{bridge_session, gap_fill_points, GapFilled, DEFAULT_GAP_STEPS};
pub use quote::{ensure_ordered, parse_raw_quotes, raw_quotes_from_value, to_data_points, RawQuote};
pub use session::{segment_session, split_sessions};
