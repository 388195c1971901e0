//! Wiener Linien ogd_realtime response DTOs.
//!
//! These types map directly to the monitor endpoint's JSON. They use
//! `Option` liberally: required-ness is enforced during normalization so
//! that one malformed monitor or line never fails the whole response.

use serde::Deserialize;

/// Top-level response from the monitor endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorResponse {
    /// Payload container. Its absence is a structural failure.
    pub data: Option<MonitorData>,

    /// Server status block (`"OK"`, error text, server time).
    pub message: Option<ApiMessage>,
}

/// The `data` container.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorData {
    #[serde(default)]
    pub monitors: Vec<RawMonitor>,
}

/// Server status block accompanying every response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMessage {
    pub value: Option<String>,
    pub message_code: Option<i32>,
    pub server_time: Option<String>,
}

/// One monitor block: a stop and the lines currently serving it.
///
/// The feed may emit several blocks for one physical stop; the client
/// merges them by rbl before anything downstream sees them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMonitor {
    pub location_stop: Option<RawLocationStop>,

    #[serde(default)]
    pub lines: Vec<RawLine>,
}

impl RawMonitor {
    /// The stop identifier buried in the location block, if present.
    pub fn rbl(&self) -> Option<u32> {
        self.location_stop.as_ref()?.properties.attributes.rbl
    }
}

/// GeoJSON-style stop location.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLocationStop {
    pub properties: RawStopProperties,
    pub geometry: Option<RawGeometry>,
}

/// Stop properties. `gate` is the boarding-gate label that lines at this
/// stop inherit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStopProperties {
    pub name: Option<String>,
    pub title: Option<String>,
    pub municipality: Option<String>,
    pub gate: Option<String>,

    #[serde(default)]
    pub attributes: RawStopAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStopAttributes {
    pub rbl: Option<u32>,
}

/// Point geometry; coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// One line block within a monitor.
///
/// The numeric line identifier appears as `lineId` on line blocks but as
/// `linienId` on vehicle blocks; both spellings are accepted in both
/// places since the feed has used them interchangeably.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLine {
    pub name: Option<String>,
    pub towards: Option<String>,
    pub direction: Option<String>,
    pub platform: Option<String>,

    #[serde(default)]
    pub barrier_free: bool,

    pub line_id: Option<u32>,
    pub linien_id: Option<u32>,

    #[serde(rename = "type")]
    pub line_type: Option<String>,

    #[serde(default)]
    pub realtime_supported: bool,

    #[serde(default)]
    pub trafficjam: bool,

    pub departures: Option<RawDepartures>,
}

/// Wrapper around the departure list.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDepartures {
    #[serde(default)]
    pub departure: Vec<RawDeparture>,
}

/// One departure entry. Metro lines supply a single `vehicle` block shared
/// by several `departureTime` entries, so `vehicle` is optional here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeparture {
    pub departure_time: Option<RawDepartureTime>,
    pub vehicle: Option<RawVehicle>,
}

/// Planned/real timestamps plus the feed's own countdown in minutes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDepartureTime {
    pub time_planned: Option<String>,
    pub time_real: Option<String>,
    pub countdown: Option<i32>,
}

/// Vehicle block attached to a departure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVehicle {
    pub name: Option<String>,
    pub towards: Option<String>,
    pub direction: Option<String>,
    pub platform: Option<String>,

    #[serde(default)]
    pub barrier_free: bool,

    pub linien_id: Option<u32>,
    pub line_id: Option<u32>,

    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,

    #[serde(default)]
    pub realtime_supported: bool,

    #[serde(default)]
    pub trafficjam: bool,
}
