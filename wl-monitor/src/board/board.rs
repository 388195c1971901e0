//! Departure board descriptors and their query functions.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Departure, Line, Monitor};

use super::countdown::Countdown;
use super::key::BoardKey;

/// Display format for departure times in attribute bags.
const TIME_STR_FORMAT: &str = "%H:%M";

/// Prefix shared by all board unique ids.
const UNIQUE_ID_PREFIX: &str = "wienerlinien_";

/// Feed direction code marking outbound travel.
const OUTBOUND_DIRECTION: &str = "H";

/// Icon classification derived from the feed's line type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineIcon {
    Bus,
    Tram,
    Metro,
    Rail,
}

impl LineIcon {
    /// Case-insensitive classification; anything unknown is other-rail.
    pub fn from_line_type(line_type: &str) -> Self {
        match line_type.to_ascii_lowercase().as_str() {
            "ptbus" => LineIcon::Bus,
            "pttram" => LineIcon::Tram,
            "ptmetro" => LineIcon::Metro,
            _ => LineIcon::Rail,
        }
    }

    /// Material Design icon identifier.
    pub fn mdi(self) -> &'static str {
        match self {
            LineIcon::Bus => "mdi:bus",
            LineIcon::Tram => "mdi:tram",
            LineIcon::Metro => "mdi:subway-variant",
            LineIcon::Rail => "mdi:train-variant",
        }
    }
}

/// One published departure board: a (line, stop, direction, destination)
/// grouping with a stable identifier and on-demand live values.
///
/// Boards hold only display data copied out of the snapshot they were
/// discovered in; live values are always computed against the monitor
/// slice passed to the query functions, so a new snapshot automatically
/// invalidates anything derived from the old one.
#[derive(Debug, Clone)]
pub struct DepartureBoard {
    key: BoardKey,
    unique_id: String,
    name: String,
    icon: LineIcon,
    line_name: String,
    line_type: String,
    platform: String,
    barrier_free: bool,
    stop_title: String,
    municipality: String,
    latitude: f64,
    longitude: f64,
    departure_limit: u8,
}

/// Attribute bag exposed to the display layer on every read.
#[derive(Debug, Clone, Serialize)]
pub struct BoardAttributes {
    pub platform: String,
    pub barrier_free: bool,
    pub line_type: String,
    pub municipality: String,
    pub latitude: f64,
    pub longitude: f64,
    pub departures: Vec<BoardDeparture>,
}

/// One entry of the bounded departure detail list.
#[derive(Debug, Clone, Serialize)]
pub struct BoardDeparture {
    pub location: String,
    pub line_name: String,
    pub line_icon: &'static str,
    pub towards: String,
    pub planned_time: String,
    pub real_time: Option<String>,
    pub countdown: i32,
    pub barrier_free: bool,
    pub realtime_supported: bool,
    pub traffic_jam: bool,
}

impl DepartureBoard {
    /// Build a board for `key` from the line/monitor it was discovered in.
    pub(crate) fn new(key: BoardKey, line: &Line, monitor: &Monitor, departure_limit: u8) -> Self {
        let direction_text = if key.direction == OUTBOUND_DIRECTION {
            "Outbound"
        } else {
            "Inbound"
        };

        let unique_id = format!(
            "{UNIQUE_ID_PREFIX}line_{}_{}_{}_{}_{}",
            monitor.location.title,
            key.rbl,
            key.line_id,
            key.direction,
            destination_slug(&key.towards),
        );
        let name = format!(
            "{} {} {} to {}",
            monitor.location.title, line.name, direction_text, key.towards
        );

        Self {
            unique_id,
            name,
            icon: LineIcon::from_line_type(&line.line_type),
            line_name: line.name.clone(),
            line_type: line.line_type.clone(),
            platform: line.platform.clone(),
            barrier_free: line.barrier_free,
            stop_title: monitor.location.title.clone(),
            municipality: monitor.location.municipality.clone(),
            latitude: monitor.location.coordinates.latitude,
            longitude: monitor.location.coordinates.longitude,
            departure_limit,
            key,
        }
    }

    pub fn key(&self) -> &BoardKey {
        &self.key
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> LineIcon {
        self.icon
    }

    /// Departures in the given snapshot matching this board's key, sorted
    /// ascending by planned time.
    pub fn filtered_departures<'m>(&self, monitors: &'m [Monitor]) -> Vec<&'m Departure> {
        let mut matches: Vec<&Departure> = monitors
            .iter()
            .filter(|monitor| monitor.location.rbl == self.key.rbl)
            .flat_map(|monitor| monitor.lines.iter())
            .filter(|line| line.line_id == self.key.line_id)
            .flat_map(|line| line.departures.iter())
            .filter(|departure| {
                departure.vehicle.direction == self.key.direction
                    && departure.vehicle.towards == self.key.towards
            })
            .collect();
        matches.sort_by_key(|departure| departure.time.planned);
        matches
    }

    /// The next matching departure, if any.
    pub fn next_departure<'m>(&self, monitors: &'m [Monitor]) -> Option<&'m Departure> {
        self.filtered_departures(monitors).into_iter().next()
    }

    /// Live value: countdown classification of the next departure, or
    /// `None` when nothing in the snapshot matches.
    pub fn state(&self, monitors: &[Monitor], now: DateTime<Utc>) -> Option<Countdown> {
        self.next_departure(monitors)
            .map(|departure| Countdown::classify(departure.time.effective(), now))
    }

    /// Attribute bag: board display data plus the filtered departure list
    /// truncated to the configured limit.
    pub fn attributes(&self, monitors: &[Monitor]) -> BoardAttributes {
        let departures = self
            .filtered_departures(monitors)
            .into_iter()
            .take(usize::from(self.departure_limit))
            .map(|departure| BoardDeparture {
                location: self.stop_title.clone(),
                line_name: self.line_name.clone(),
                line_icon: self.icon.mdi(),
                towards: departure.vehicle.towards.clone(),
                planned_time: departure.time.planned.format(TIME_STR_FORMAT).to_string(),
                real_time: departure
                    .time
                    .real
                    .map(|t| t.format(TIME_STR_FORMAT).to_string()),
                countdown: departure.time.countdown,
                barrier_free: departure.vehicle.barrier_free,
                realtime_supported: departure.vehicle.realtime_supported,
                traffic_jam: departure.vehicle.traffic_jam,
            })
            .collect();

        BoardAttributes {
            platform: self.platform.clone(),
            barrier_free: self.barrier_free,
            line_type: self.line_type.clone(),
            municipality: self.municipality.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            departures,
        }
    }
}

/// Destination slug used in unique ids: lowercase, commas removed,
/// spaces replaced by underscores.
pub(crate) fn destination_slug(towards: &str) -> String {
    towards.replace(',', "").replace(' ', "_").to_lowercase()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn slug_sanitizes_destination() {
        assert_eq!(destination_slug("Floridsdorf, Bahnhof"), "floridsdorf_bahnhof");
        assert_eq!(destination_slug("Leopoldau"), "leopoldau");
    }

    #[test]
    fn icon_classification_is_case_insensitive() {
        assert_eq!(LineIcon::from_line_type("ptBus"), LineIcon::Bus);
        assert_eq!(LineIcon::from_line_type("PTTRAM"), LineIcon::Tram);
        assert_eq!(LineIcon::from_line_type("ptMetro"), LineIcon::Metro);
        assert_eq!(LineIcon::from_line_type("ptTrainS"), LineIcon::Rail);
    }

    #[test]
    fn icon_mdi_identifiers() {
        assert_eq!(LineIcon::Bus.mdi(), "mdi:bus");
        assert_eq!(LineIcon::Tram.mdi(), "mdi:tram");
        assert_eq!(LineIcon::Metro.mdi(), "mdi:subway-variant");
        assert_eq!(LineIcon::Rail.mdi(), "mdi:train-variant");
    }

    proptest! {
        #[test]
        fn slug_never_contains_commas_spaces_or_uppercase(towards in ".{0,40}") {
            let slug = destination_slug(&towards);
            prop_assert!(!slug.contains(','));
            prop_assert!(!slug.contains(' '));
            prop_assert_eq!(slug.to_lowercase(), slug);
        }
    }
}
