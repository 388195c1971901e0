//! Wiener Linien realtime departure monitor.
//!
//! Polls the open-data monitor endpoint for a fixed set of stop points,
//! normalizes the feed into a typed model, and groups departures into
//! per-direction departure boards with stable identifiers.

pub mod board;
pub mod config;
pub mod domain;
pub mod events;
pub mod wienerlinien;
