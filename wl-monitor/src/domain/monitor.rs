//! Per-stop monitor: one stop's complete state at one polling instant.

use chrono::{DateTime, FixedOffset};

use super::{Line, StopLocation};

/// One physical stop together with every line serving it, as observed in a
/// single poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    pub location: StopLocation,
    pub lines: Vec<Line>,
}

impl Monitor {
    /// Distinct line names serving this stop, in feed order.
    pub fn line_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !names.contains(&line.name.as_str()) {
                names.push(&line.name);
            }
        }
        names
    }

    /// The chronologically nearest departure per line, labelled
    /// `"<line> to <destination>"` and sorted by effective time.
    pub fn next_departures(&self) -> Vec<(String, DateTime<FixedOffset>)> {
        let mut next: Vec<(String, DateTime<FixedOffset>)> = self
            .lines
            .iter()
            .filter_map(|line| {
                line.departures
                    .iter()
                    .map(|dep| dep.time.effective())
                    .min()
                    .map(|time| (format!("{} to {}", line.name, line.towards), time))
            })
            .collect();
        next.sort_by_key(|(_, time)| *time);
        next
    }
}
