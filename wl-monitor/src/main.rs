use std::collections::BTreeMap;
use std::fmt::Display;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wl_monitor::board::{BoardKey, DepartureBoard, discover_boards};
use wl_monitor::config::{DEFAULT_DEPARTURE_LIMIT, DEFAULT_POLL_INTERVAL_SECS, Settings};
use wl_monitor::events::TracingSink;
use wl_monitor::wienerlinien::{
    ApiError, NormalizeError, WienerLinienClient, WienerLinienConfig, normalize,
};

/// A poll cycle failure; the loop logs it and waits for the next tick.
#[derive(Debug, thiserror::Error)]
enum CycleError {
    #[error("fetch failed: {0}")]
    Api(#[from] ApiError),

    #[error("normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("no usable monitors in response")]
    NoMonitors,
}

/// Read an optional environment variable, falling back to `default`.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring unparseable {name}={raw}, using {default}");
                default
            }
        },
        Err(_) => default,
    }
}

async fn run_cycle(
    client: &WienerLinienClient,
    settings: &Settings,
    sink: &TracingSink,
    boards: &mut BTreeMap<BoardKey, DepartureBoard>,
) -> Result<(), CycleError> {
    let snapshot = client.fetch(&settings.stops).await?;
    let monitors = normalize(&snapshot, sink)?;
    if monitors.is_empty() {
        return Err(CycleError::NoMonitors);
    }

    // Boards persist across cycles; a snapshot can only add new ones.
    for board in discover_boards(&monitors, settings.departure_limit) {
        boards.entry(board.key().clone()).or_insert(board);
    }

    let now = Utc::now();
    for board in boards.values() {
        let report = serde_json::json!({
            "unique_id": board.unique_id(),
            "name": board.name(),
            "state": board.state(&monitors, now).map(|c| c.to_string()),
            "attributes": board.attributes(&monitors),
        });
        println!("{report}");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Ok(stops) = std::env::var("WL_STOPS") else {
        eprintln!("WL_STOPS not set. Provide a comma-separated list of stop point ids.");
        return ExitCode::from(2);
    };
    let departure_limit = env_or("WL_DEPARTURE_LIMIT", DEFAULT_DEPARTURE_LIMIT);
    let poll_interval = env_or("WL_POLL_INTERVAL", DEFAULT_POLL_INTERVAL_SECS);

    let settings = match Settings::new(&stops, departure_limit, poll_interval) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let sink = Arc::new(TracingSink);
    let client = WienerLinienClient::new(WienerLinienConfig::default())
        .expect("Failed to create Wiener Linien client")
        .with_sink(sink.clone());

    info!(
        stops = %settings.stops.query_key(),
        interval_secs = settings.poll_interval.as_secs(),
        "starting monitor loop"
    );

    let mut boards: BTreeMap<BoardKey, DepartureBoard> = BTreeMap::new();
    let mut ticker = tokio::time::interval(settings.poll_interval);
    loop {
        ticker.tick().await;
        if let Err(e) = run_cycle(&client, &settings, &sink, &mut boards).await {
            warn!("poll cycle failed: {e}");
        }
    }
}
