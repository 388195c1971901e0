//! Stop identifier and location types.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// A numeric RBL stop/platform identifier as used by the upstream feed.
///
/// One `StopId` names one physical platform or boarding point. The type
/// guarantees a well-formed numeric identifier by construction.
///
/// # Examples
///
/// ```
/// use wl_monitor::domain::StopId;
///
/// let rbl = StopId::parse("4111").unwrap();
/// assert_eq!(rbl.as_u32(), 4111);
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("U4").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct StopId(u32);

impl StopId {
    /// Wrap an already-numeric identifier.
    pub const fn new(raw: u32) -> Self {
        StopId(raw)
    }

    /// Parse a stop id from a decimal string.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be empty",
            });
        }

        s.parse::<u32>().map(StopId).map_err(|_| InvalidStopId {
            reason: "must be a decimal number",
        })
    }

    /// Returns the raw numeric identifier.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StopId {
    type Err = InvalidStopId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StopId::parse(s)
    }
}

/// Error returned when parsing a stop-set string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StopSetError {
    /// No stop ids at all.
    #[error("stop set is empty")]
    Empty,

    /// One of the entries is not a valid stop id.
    #[error("invalid entry {entry:?}: {source}")]
    InvalidEntry {
        entry: String,
        source: InvalidStopId,
    },
}

/// Canonical ordered set of stop identifiers.
///
/// Duplicates collapse on construction and iteration follows numeric order,
/// so two sets naming the same stops always produce the same upstream query
/// and the same cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopSet(BTreeSet<StopId>);

impl StopSet {
    /// Build a stop set from any collection of ids.
    pub fn new(ids: impl IntoIterator<Item = StopId>) -> Self {
        StopSet(ids.into_iter().collect())
    }

    /// Parse a comma-separated list of stop ids (e.g. `"4111,4205"`).
    pub fn parse(s: &str) -> Result<Self, StopSetError> {
        let mut ids = BTreeSet::new();

        for entry in s.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let id = StopId::parse(entry).map_err(|source| StopSetError::InvalidEntry {
                entry: entry.to_string(),
                source,
            })?;
            ids.insert(id);
        }

        if ids.is_empty() {
            return Err(StopSetError::Empty);
        }

        Ok(StopSet(ids))
    }

    /// Iterate ids in canonical (numeric) order.
    pub fn iter(&self) -> impl Iterator<Item = StopId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The canonical joined form, used as the cache key.
    pub fn query_key(&self) -> String {
        let mut key = String::new();
        for id in self.iter() {
            if !key.is_empty() {
                key.push(',');
            }
            key.push_str(&id.to_string());
        }
        key
    }
}

/// WGS84 coordinates of a stop.
///
/// Constructed from the feed's fixed `[longitude, latitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// Location information for one physical stop. Immutable after construction
/// from a response.
#[derive(Debug, Clone, PartialEq)]
pub struct StopLocation {
    pub name: String,
    pub title: String,
    pub municipality: String,
    pub rbl: StopId,
    pub coordinates: Coordinates,
}
