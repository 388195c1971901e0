//! Wiener Linien ogd_realtime client.
//!
//! HTTP client and normalizer for the public realtime monitor feed.
//!
//! Key characteristics of the feed:
//! - unauthenticated GET endpoint; one request carries repeated `rbl`
//!   query parameters, one per stop
//! - duplicate monitor blocks for one physical stop do occur and must be
//!   merged by rbl before parsing
//! - metro lines may supply a single vehicle block shared by several
//!   departure times
//! - timestamps are ISO 8601 with a numeric UTC offset (`+0100`)

mod client;
mod error;
mod normalize;
mod types;

pub use client::{WienerLinienClient, WienerLinienConfig};
pub use error::ApiError;
pub use normalize::{ConversionError, NormalizeError, normalize};
pub use types::{
    ApiMessage, MonitorData, MonitorResponse, RawDeparture, RawDepartureTime, RawDepartures,
    RawGeometry, RawLine, RawLocationStop, RawMonitor, RawStopAttributes, RawStopProperties,
    RawVehicle,
};
