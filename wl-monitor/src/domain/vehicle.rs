//! Vehicle information attached to a departure.

/// One vehicle as reported by the feed: display name, destination, and the
/// flags a display layer cares about.
///
/// `line_id` is the numeric line identifier; the feed reports it under two
/// alternative field names and the normalizer resolves whichever is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub name: String,
    pub towards: String,
    pub direction: String,
    pub platform: String,
    pub barrier_free: bool,
    pub line_id: u32,
    pub vehicle_type: String,
    pub realtime_supported: bool,
    pub traffic_jam: bool,
}
