//! A line serving a stop.

use super::Departure;

/// One line block of a monitor: the line's display data plus its departures
/// in feed order (the feed does not guarantee time order; sorting is a
/// presentation concern).
///
/// `gate` is the boarding-gate label taken from the parent stop's raw
/// properties, not from the line block itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub name: String,
    pub towards: String,
    pub direction: String,
    pub platform: String,
    pub barrier_free: bool,
    pub line_id: u32,
    pub line_type: String,
    pub gate: Option<String>,
    pub departures: Vec<Departure>,
}
