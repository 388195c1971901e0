//! Validated runtime settings.
//!
//! Bounds are rejected here, before any client exists: the upstream API is
//! rate limited, so the poll interval has a floor as well as a ceiling.

use std::time::Duration;

use crate::domain::{StopSet, StopSetError};

/// Default number of departures exposed per board.
pub const DEFAULT_DEPARTURE_LIMIT: u8 = 5;

/// Default poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

const DEPARTURE_LIMIT_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
const POLL_INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 10..=300;

/// Configuration errors; all reported before the first fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid stop list: {0}")]
    Stops(#[from] StopSetError),

    #[error("departure limit {0} out of range (1-10)")]
    DepartureLimit(u8),

    #[error("poll interval {0}s out of range (10-300)")]
    PollInterval(u64),
}

/// Validated settings for one monitor deployment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The stop set every poll cycle queries.
    pub stops: StopSet,

    /// Maximum departures exposed per board (1-10).
    pub departure_limit: u8,

    /// Interval between poll cycles (10-300 s). The scheduler owns the
    /// timer; this bound is the contract it must respect.
    pub poll_interval: Duration,
}

impl Settings {
    /// Validate and build settings from raw values.
    pub fn new(
        stops: &str,
        departure_limit: u8,
        poll_interval_secs: u64,
    ) -> Result<Self, ConfigError> {
        let stops = StopSet::parse(stops)?;

        if !DEPARTURE_LIMIT_RANGE.contains(&departure_limit) {
            return Err(ConfigError::DepartureLimit(departure_limit));
        }

        if !POLL_INTERVAL_RANGE.contains(&poll_interval_secs) {
            return Err(ConfigError::PollInterval(poll_interval_secs));
        }

        Ok(Self {
            stops,
            departure_limit,
            poll_interval: Duration::from_secs(poll_interval_secs),
        })
    }
}
