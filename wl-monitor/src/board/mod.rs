//! Entity grouping engine.
//!
//! Derives one addressable departure board per distinct
//! (line, stop, direction, destination) combination found in a snapshot,
//! with deterministic identifiers and on-demand live values.

mod board;
mod countdown;
mod engine;
mod key;

pub use board::{BoardAttributes, BoardDeparture, DepartureBoard, LineIcon};
pub use countdown::Countdown;
pub use engine::discover_boards;
pub use key::BoardKey;
