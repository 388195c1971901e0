//! Grouping-key discovery over a monitor snapshot.

use std::collections::BTreeMap;

use crate::domain::Monitor;

use super::board::DepartureBoard;
use super::key::BoardKey;

/// Scan every monitor/line/departure triple once and produce one board per
/// distinct (line, stop, direction, destination) combination.
///
/// Keys are collected into an ordered map, so the same snapshot always
/// yields the same boards in the same order. Display data (stop title,
/// line name, platform) comes from the first line the key was seen on.
pub fn discover_boards(monitors: &[Monitor], departure_limit: u8) -> Vec<DepartureBoard> {
    let mut boards: BTreeMap<BoardKey, DepartureBoard> = BTreeMap::new();

    for monitor in monitors {
        for line in &monitor.lines {
            for departure in &line.departures {
                let key = BoardKey {
                    line_id: line.line_id,
                    rbl: monitor.location.rbl,
                    direction: departure.vehicle.direction.clone(),
                    towards: departure.vehicle.towards.clone(),
                };

                if !boards.contains_key(&key) {
                    let board = DepartureBoard::new(key.clone(), line, monitor, departure_limit);
                    boards.insert(key, board);
                }
            }
        }
    }

    boards.into_values().collect()
}
