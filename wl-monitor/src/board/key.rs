//! Grouping key for departure boards.

use crate::domain::StopId;

/// Identity of one published departure board: the
/// (line, stop, direction, destination) combination it tracks.
///
/// Identity is the tuple itself — never a hash or iteration order — and
/// the derived ordering makes discovery output deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardKey {
    pub line_id: u32,
    pub rbl: StopId,
    pub direction: String,
    pub towards: String,
}
