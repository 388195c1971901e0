//! Departure times and departures.

use chrono::{DateTime, FixedOffset};

use super::Vehicle;

/// Planned and (optionally) live departure time for one vehicle.
///
/// A missing `real` timestamp means the departure has no live tracking; the
/// planned timestamp is then authoritative for display and sorting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepartureTime {
    pub planned: DateTime<FixedOffset>,
    pub real: Option<DateTime<FixedOffset>>,
    /// Minutes until departure as reported by the feed.
    pub countdown: i32,
}

impl DepartureTime {
    /// The authoritative timestamp: real when live tracking is available,
    /// planned otherwise.
    pub fn effective(&self) -> DateTime<FixedOffset> {
        self.real.unwrap_or(self.planned)
    }
}

/// One departure: a time paired with the vehicle serving it.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub time: DepartureTime,
    pub vehicle: Vehicle,
}
