//! Core entity model for the departure pipeline.
//!
//! Plain owned records with no back-references: departures are built before
//! lines, lines before monitors, and each child carries only the parent
//! fields it actually needs (e.g. a line holds the stop's boarding gate,
//! not the stop). Code that receives these types can trust they were
//! validated during normalization.

mod departure;
mod line;
mod monitor;
mod stop;
mod vehicle;

pub use departure::{Departure, DepartureTime};
pub use line::Line;
pub use monitor::Monitor;
pub use stop::{Coordinates, InvalidStopId, StopId, StopLocation, StopSet, StopSetError};
pub use vehicle::Vehicle;
