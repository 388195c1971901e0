//! Conversion from feed DTOs to the domain model.
//!
//! A failed monitor or line is reported through the event sink and skipped;
//! partial results are expected. Only a missing top-level container fails
//! the whole batch.

use chrono::{DateTime, FixedOffset};

use crate::domain::{
    Coordinates, Departure, DepartureTime, Line, Monitor, StopId, StopLocation, Vehicle,
};
use crate::events::{EventSink, PipelineEvent};

use super::types::{
    MonitorResponse, RawDeparture, RawDepartureTime, RawLine, RawLocationStop, RawMonitor,
    RawVehicle,
};

/// Timestamp layout used by the feed (`2024-01-15T14:30:00.000+0100`).
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Structural failure of the whole response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// The response has no `data`/`monitors` container at all.
    #[error("response has no data.monitors container")]
    MissingContainer,
}

/// Failure converting a single monitor or line; skips that unit only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// A field the domain model requires is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A timestamp did not match the feed layout.
    #[error("invalid timestamp: {0}")]
    InvalidTime(String),

    /// Coordinates were not the fixed `[lon, lat]` pair.
    #[error("coordinates must be [lon, lat], got {0} values")]
    BadCoordinates(usize),

    /// The numeric line identifier is absent under both known field names.
    /// This indicates an upstream schema change, never a defaultable value.
    #[error("line id missing under both lineId and linienId")]
    MissingLineId,
}

/// Convert a (merged) response into domain monitors.
///
/// Monitors keep their first-appearance order; lines and departures keep
/// feed order.
pub fn normalize(
    response: &MonitorResponse,
    sink: &dyn EventSink,
) -> Result<Vec<Monitor>, NormalizeError> {
    let Some(data) = response.data.as_ref() else {
        return Err(NormalizeError::MissingContainer);
    };

    let mut monitors = Vec::with_capacity(data.monitors.len());
    for raw in &data.monitors {
        match convert_monitor(raw, sink) {
            Ok(monitor) => monitors.push(monitor),
            Err(err) => sink.emit(PipelineEvent::MonitorSkipped {
                rbl: raw.rbl(),
                reason: err.to_string(),
            }),
        }
    }

    Ok(monitors)
}

fn convert_monitor(raw: &RawMonitor, sink: &dyn EventSink) -> Result<Monitor, ConversionError> {
    let location_stop = raw
        .location_stop
        .as_ref()
        .ok_or(ConversionError::MissingField("locationStop"))?;

    let location = convert_location(location_stop)?;
    let gate = location_stop.properties.gate.as_deref();

    let mut lines = Vec::with_capacity(raw.lines.len());
    for raw_line in &raw.lines {
        match convert_line(raw_line, gate) {
            Ok(line) => lines.push(line),
            Err(err) => sink.emit(PipelineEvent::LineSkipped {
                rbl: location.rbl.as_u32(),
                line: raw_line.name.clone(),
                reason: err.to_string(),
            }),
        }
    }

    Ok(Monitor { location, lines })
}

fn convert_location(raw: &RawLocationStop) -> Result<StopLocation, ConversionError> {
    let properties = &raw.properties;

    let name = properties
        .name
        .clone()
        .ok_or(ConversionError::MissingField("properties.name"))?;
    let title = properties
        .title
        .clone()
        .ok_or(ConversionError::MissingField("properties.title"))?;
    let municipality = properties
        .municipality
        .clone()
        .ok_or(ConversionError::MissingField("properties.municipality"))?;
    let rbl = properties
        .attributes
        .rbl
        .ok_or(ConversionError::MissingField("attributes.rbl"))?;

    let geometry = raw
        .geometry
        .as_ref()
        .ok_or(ConversionError::MissingField("geometry"))?;
    let coordinates = match geometry.coordinates.as_slice() {
        [longitude, latitude] => Coordinates {
            longitude: *longitude,
            latitude: *latitude,
        },
        other => return Err(ConversionError::BadCoordinates(other.len())),
    };

    Ok(StopLocation {
        name,
        title,
        municipality,
        rbl: StopId::new(rbl),
        coordinates,
    })
}

fn convert_line(raw: &RawLine, gate: Option<&str>) -> Result<Line, ConversionError> {
    let name = raw
        .name
        .clone()
        .ok_or(ConversionError::MissingField("line.name"))?;
    let towards = raw
        .towards
        .clone()
        .ok_or(ConversionError::MissingField("line.towards"))?;
    let direction = raw
        .direction
        .clone()
        .ok_or(ConversionError::MissingField("line.direction"))?;
    let line_type = raw
        .line_type
        .clone()
        .ok_or(ConversionError::MissingField("line.type"))?;
    let line_id = raw
        .line_id
        .or(raw.linien_id)
        .ok_or(ConversionError::MissingLineId)?;
    let platform = raw.platform.clone().unwrap_or_default();

    let raw_departures = raw
        .departures
        .as_ref()
        .map(|d| d.departure.as_slice())
        .unwrap_or(&[]);

    // Metro lines supply one vehicle block shared by several departure
    // times; whichever block exists is broadcast to the vehicle-less
    // entries. With no block at all, the line's own fields stand in.
    let shared_vehicle = raw_departures.iter().find_map(|d| d.vehicle.as_ref());

    let mut departures = Vec::with_capacity(raw_departures.len());
    for raw_departure in raw_departures {
        departures.push(convert_departure(raw_departure, shared_vehicle, raw, line_id)?);
    }

    Ok(Line {
        name,
        towards,
        direction,
        platform,
        barrier_free: raw.barrier_free,
        line_id,
        line_type,
        gate: gate.map(str::to_string),
        departures,
    })
}

fn convert_departure(
    raw: &RawDeparture,
    shared_vehicle: Option<&RawVehicle>,
    line: &RawLine,
    line_id: u32,
) -> Result<Departure, ConversionError> {
    let time = convert_departure_time(
        raw.departure_time
            .as_ref()
            .ok_or(ConversionError::MissingField("departureTime"))?,
    )?;

    let vehicle = match raw.vehicle.as_ref().or(shared_vehicle) {
        Some(raw_vehicle) => convert_vehicle(raw_vehicle)?,
        None => line_vehicle(line, line_id)?,
    };

    Ok(Departure { time, vehicle })
}

fn convert_departure_time(raw: &RawDepartureTime) -> Result<DepartureTime, ConversionError> {
    let planned = raw
        .time_planned
        .as_deref()
        .ok_or(ConversionError::MissingField("timePlanned"))?;
    let planned = parse_feed_time(planned)?;

    let real = raw
        .time_real
        .as_deref()
        .map(parse_feed_time)
        .transpose()?;

    let countdown = raw
        .countdown
        .ok_or(ConversionError::MissingField("countdown"))?;

    Ok(DepartureTime {
        planned,
        real,
        countdown,
    })
}

fn convert_vehicle(raw: &RawVehicle) -> Result<Vehicle, ConversionError> {
    Ok(Vehicle {
        name: raw
            .name
            .clone()
            .ok_or(ConversionError::MissingField("vehicle.name"))?,
        towards: raw
            .towards
            .clone()
            .ok_or(ConversionError::MissingField("vehicle.towards"))?,
        direction: raw
            .direction
            .clone()
            .ok_or(ConversionError::MissingField("vehicle.direction"))?,
        platform: raw.platform.clone().unwrap_or_default(),
        barrier_free: raw.barrier_free,
        line_id: raw
            .linien_id
            .or(raw.line_id)
            .ok_or(ConversionError::MissingLineId)?,
        vehicle_type: raw
            .vehicle_type
            .clone()
            .ok_or(ConversionError::MissingField("vehicle.type"))?,
        realtime_supported: raw.realtime_supported,
        traffic_jam: raw.trafficjam,
    })
}

/// Vehicle synthesized from the line's own fields, for lines whose feed
/// data carries no vehicle block at all.
fn line_vehicle(line: &RawLine, line_id: u32) -> Result<Vehicle, ConversionError> {
    Ok(Vehicle {
        name: line
            .name
            .clone()
            .ok_or(ConversionError::MissingField("line.name"))?,
        towards: line
            .towards
            .clone()
            .ok_or(ConversionError::MissingField("line.towards"))?,
        direction: line
            .direction
            .clone()
            .ok_or(ConversionError::MissingField("line.direction"))?,
        platform: line.platform.clone().unwrap_or_default(),
        barrier_free: line.barrier_free,
        line_id,
        vehicle_type: line
            .line_type
            .clone()
            .ok_or(ConversionError::MissingField("line.type"))?,
        realtime_supported: line.realtime_supported,
        traffic_jam: line.trafficjam,
    })
}

fn parse_feed_time(s: &str) -> Result<DateTime<FixedOffset>, ConversionError> {
    DateTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|_| ConversionError::InvalidTime(s.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::events::RecordingSink;

    use super::*;

    fn response(json: serde_json::Value) -> MonitorResponse {
        serde_json::from_value(json).unwrap()
    }

    fn monitor_json(rbl: u32, lines: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "locationStop": {
                "geometry": {"coordinates": [16.4402, 48.2503]},
                "properties": {
                    "name": format!("60201{rbl}"),
                    "title": "Kagraner Platz",
                    "municipality": "Wien",
                    "gate": "2",
                    "attributes": {"rbl": rbl}
                }
            },
            "lines": lines
        })
    }

    fn tram_line_json() -> serde_json::Value {
        serde_json::json!({
            "name": "26",
            "towards": "Strebersdorf",
            "direction": "R",
            "platform": "1",
            "barrierFree": true,
            "type": "ptTram",
            "lineId": 126,
            "departures": {"departure": [
                {
                    "departureTime": {
                        "timePlanned": "2024-01-15T14:30:00.000+0100",
                        "timeReal": "2024-01-15T14:32:00.000+0100",
                        "countdown": 5
                    },
                    "vehicle": {
                        "name": "26",
                        "towards": "Strebersdorf",
                        "direction": "R",
                        "platform": "1",
                        "barrierFree": true,
                        "realtimeSupported": true,
                        "trafficjam": false,
                        "type": "ptTram",
                        "linienId": 126
                    }
                }
            ]}
        })
    }

    fn vienna(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 15, h, m, 0)
            .unwrap()
    }

    #[test]
    fn parses_feed_timestamps() {
        assert_eq!(
            parse_feed_time("2024-01-15T14:30:00.000+0100").unwrap(),
            vienna(14, 30)
        );
        // Also without fractional seconds.
        assert_eq!(
            parse_feed_time("2024-01-15T14:30:00+0100").unwrap(),
            vienna(14, 30)
        );
        assert!(parse_feed_time("14:30").is_err());
    }

    #[test]
    fn normalizes_full_monitor() {
        let sink = RecordingSink::new();
        let resp = response(serde_json::json!({
            "data": {"monitors": [monitor_json(4111, serde_json::json!([tram_line_json()]))]}
        }));

        let monitors = normalize(&resp, &sink).unwrap();
        assert_eq!(monitors.len(), 1);

        let monitor = &monitors[0];
        assert_eq!(monitor.location.rbl, StopId::new(4111));
        assert_eq!(monitor.location.title, "Kagraner Platz");
        assert_eq!(monitor.location.coordinates.longitude, 16.4402);
        assert_eq!(monitor.location.coordinates.latitude, 48.2503);

        let line = &monitor.lines[0];
        assert_eq!(line.line_id, 126);
        // Gate comes from the stop's properties, not the line block.
        assert_eq!(line.gate.as_deref(), Some("2"));

        let departure = &line.departures[0];
        assert_eq!(departure.time.planned, vienna(14, 30));
        assert_eq!(departure.time.real, Some(vienna(14, 32)));
        assert_eq!(departure.time.countdown, 5);
        assert_eq!(departure.vehicle.line_id, 126);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn missing_container_is_structural_failure() {
        let sink = RecordingSink::new();
        let resp = response(serde_json::json!({"message": {"value": "DB timeout"}}));

        assert_eq!(
            normalize(&resp, &sink).unwrap_err(),
            NormalizeError::MissingContainer
        );
    }

    #[test]
    fn broadcasts_single_vehicle_across_metro_departures() {
        let sink = RecordingSink::new();
        let line = serde_json::json!({
            "name": "U1",
            "towards": "Leopoldau",
            "direction": "H",
            "platform": "2",
            "barrierFree": true,
            "type": "ptMetro",
            "lineId": 301,
            "departures": {"departure": [
                {
                    "departureTime": {"timePlanned": "2024-01-15T14:30:00.000+0100", "countdown": 3},
                    "vehicle": {
                        "name": "U1", "towards": "Leopoldau", "direction": "H",
                        "platform": "2", "barrierFree": true, "realtimeSupported": true,
                        "type": "ptMetro", "linienId": 301
                    }
                },
                {"departureTime": {"timePlanned": "2024-01-15T14:35:00.000+0100", "countdown": 8}},
                {"departureTime": {"timePlanned": "2024-01-15T14:40:00.000+0100", "countdown": 13}}
            ]}
        });
        let resp = response(serde_json::json!({
            "data": {"monitors": [monitor_json(4111, serde_json::json!([line]))]}
        }));

        let monitors = normalize(&resp, &sink).unwrap();
        let departures = &monitors[0].lines[0].departures;

        assert_eq!(departures.len(), 3);
        assert_eq!(departures[0].vehicle, departures[1].vehicle);
        assert_eq!(departures[1].vehicle, departures[2].vehicle);
        assert_eq!(departures[2].vehicle.towards, "Leopoldau");
    }

    #[test]
    fn synthesizes_vehicle_from_line_when_feed_has_none() {
        let sink = RecordingSink::new();
        let line = serde_json::json!({
            "name": "U1",
            "towards": "Leopoldau",
            "direction": "H",
            "platform": "2",
            "barrierFree": true,
            "realtimeSupported": true,
            "type": "ptMetro",
            "lineId": 301,
            "departures": {"departure": [
                {"departureTime": {"timePlanned": "2024-01-15T14:30:00.000+0100", "countdown": 3}}
            ]}
        });
        let resp = response(serde_json::json!({
            "data": {"monitors": [monitor_json(4111, serde_json::json!([line]))]}
        }));

        let monitors = normalize(&resp, &sink).unwrap();
        let vehicle = &monitors[0].lines[0].departures[0].vehicle;

        assert_eq!(vehicle.name, "U1");
        assert_eq!(vehicle.line_id, 301);
        assert_eq!(vehicle.vehicle_type, "ptMetro");
        assert!(vehicle.realtime_supported);
    }

    #[test]
    fn missing_line_id_skips_only_that_line() {
        let sink = RecordingSink::new();
        let mut broken = tram_line_json();
        broken["lineId"] = serde_json::Value::Null;
        broken["name"] = serde_json::json!("31");

        let resp = response(serde_json::json!({
            "data": {"monitors": [monitor_json(4111, serde_json::json!([broken, tram_line_json()]))]}
        }));

        let monitors = normalize(&resp, &sink).unwrap();
        assert_eq!(monitors[0].lines.len(), 1);
        assert_eq!(monitors[0].lines[0].name, "26");

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            PipelineEvent::LineSkipped { rbl: 4111, line: Some(name), reason }
                if name == "31" && reason.contains("lineId")
        ));
    }

    #[test]
    fn bad_monitor_skips_only_that_monitor() {
        let sink = RecordingSink::new();
        let mut bad = monitor_json(9999, serde_json::json!([tram_line_json()]));
        bad["locationStop"]["geometry"]["coordinates"] = serde_json::json!([16.44, 48.25, 0.0]);

        let resp = response(serde_json::json!({
            "data": {"monitors": [bad, monitor_json(4111, serde_json::json!([tram_line_json()]))]}
        }));

        let monitors = normalize(&resp, &sink).unwrap();
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].location.rbl, StopId::new(4111));

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            PipelineEvent::MonitorSkipped { rbl: Some(9999), reason }
                if reason.contains("lon, lat")
        ));
    }

    #[test]
    fn missing_required_stop_field_skips_monitor() {
        let sink = RecordingSink::new();
        let mut bad = monitor_json(9999, serde_json::json!([tram_line_json()]));
        bad["locationStop"]["properties"]["municipality"] = serde_json::Value::Null;

        let resp = response(serde_json::json!({"data": {"monitors": [bad]}}));

        let monitors = normalize(&resp, &sink).unwrap();
        assert!(monitors.is_empty());
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn departures_keep_feed_order() {
        let sink = RecordingSink::new();
        let mut line = tram_line_json();
        // Prepend a later departure: feed order is not time order.
        line["departures"]["departure"] = serde_json::json!([
            {
                "departureTime": {"timePlanned": "2024-01-15T15:00:00.000+0100", "countdown": 35},
                "vehicle": {
                    "name": "26", "towards": "Strebersdorf", "direction": "R",
                    "platform": "1", "type": "ptTram", "linienId": 126
                }
            },
            {
                "departureTime": {"timePlanned": "2024-01-15T14:30:00.000+0100", "countdown": 5},
                "vehicle": {
                    "name": "26", "towards": "Strebersdorf", "direction": "R",
                    "platform": "1", "type": "ptTram", "linienId": 126
                }
            }
        ]);

        let resp = response(serde_json::json!({
            "data": {"monitors": [monitor_json(4111, serde_json::json!([line]))]}
        }));

        let monitors = normalize(&resp, &sink).unwrap();
        let departures = &monitors[0].lines[0].departures;
        assert_eq!(departures[0].time.planned, vienna(15, 0));
        assert_eq!(departures[1].time.planned, vienna(14, 30));
    }

    #[test]
    fn vehicle_line_id_resolves_from_either_field() {
        let from_linien_id: RawVehicle = serde_json::from_value(serde_json::json!({
            "name": "26", "towards": "X", "direction": "H", "type": "ptTram", "linienId": 126
        }))
        .unwrap();
        assert_eq!(convert_vehicle(&from_linien_id).unwrap().line_id, 126);

        let from_line_id: RawVehicle = serde_json::from_value(serde_json::json!({
            "name": "26", "towards": "X", "direction": "H", "type": "ptTram", "lineId": 126
        }))
        .unwrap();
        assert_eq!(convert_vehicle(&from_line_id).unwrap().line_id, 126);

        let neither: RawVehicle = serde_json::from_value(serde_json::json!({
            "name": "26", "towards": "X", "direction": "H", "type": "ptTram"
        }))
        .unwrap();
        assert_eq!(
            convert_vehicle(&neither).unwrap_err(),
            ConversionError::MissingLineId
        );
    }
}
