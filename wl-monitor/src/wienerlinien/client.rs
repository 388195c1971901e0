//! Wiener Linien realtime monitor HTTP client.
//!
//! Turns the unreliable, rate-limited upstream feed into a resilient cached
//! snapshot: one request covers the whole stop set, timeouts are retried
//! with exponential backoff, any other transport failure falls back to the
//! most recent cached snapshot regardless of its age, and a fresh cache
//! entry short-circuits the network entirely.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache as MokaCache;

use crate::domain::StopSet;
use crate::events::{EventSink, PipelineEvent, TracingSink};

use super::error::ApiError;
use super::types::{MonitorResponse, RawMonitor};

/// Default base URL for the realtime monitor endpoint.
const DEFAULT_BASE_URL: &str = "https://www.wienerlinien.at/ogd_realtime/monitor";

/// Traffic-info sections requested alongside departures.
const TRAFFIC_INFO: &str = "stoerunglang";

/// Default per-attempt timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of attempts for a timed-out request.
const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default delay before the first retry; doubles per retry.
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default freshness window for cached snapshots.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Cache capacity: one entry per distinct stop-set configuration, and a
/// deployment queries a fixed handful of sets.
const DEFAULT_CACHE_CAPACITY: u64 = 8;

/// Configuration for the Wiener Linien client.
#[derive(Debug, Clone)]
pub struct WienerLinienConfig {
    /// Base URL for the monitor endpoint.
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Maximum number of attempts when requests time out.
    pub retry_count: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub retry_base_delay: Duration,
    /// How long a cached snapshot counts as fresh.
    pub cache_ttl: Duration,
    /// Maximum number of cached stop-set snapshots.
    pub cache_capacity: u64,
}

impl Default for WienerLinienConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl WienerLinienConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of attempts.
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set the base retry delay.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the cache freshness window.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// A merged snapshot together with the instant it was fetched.
///
/// Entries are never expired by the cache itself: a stale entry is still
/// the fallback of last resort when the network fails, so freshness is
/// checked against `fetched_at` instead of evicting.
struct CachedSnapshot {
    response: Arc<MonitorResponse>,
    fetched_at: Instant,
}

/// Client for the realtime monitor endpoint.
pub struct WienerLinienClient {
    http: reqwest::Client,
    base_url: String,
    retry_count: u32,
    retry_base_delay: Duration,
    cache_ttl: Duration,
    cache: MokaCache<String, Arc<CachedSnapshot>>,
    sink: Arc<dyn EventSink>,
}

impl WienerLinienClient {
    /// Create a new client with the given configuration.
    pub fn new(config: WienerLinienConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = MokaCache::builder()
            .max_capacity(config.cache_capacity)
            .build();

        Ok(Self {
            http,
            base_url: config.base_url,
            retry_count: config.retry_count.max(1),
            retry_base_delay: config.retry_base_delay,
            cache_ttl: config.cache_ttl,
            cache,
            sink: Arc::new(TracingSink),
        })
    }

    /// Replace the default tracing sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Fetch the merged snapshot for a stop set.
    ///
    /// Serves from cache when the entry is within the freshness window;
    /// otherwise fetches, merging duplicate monitor blocks and updating the
    /// cache. On failure, a cache entry of any age is returned as a
    /// degraded success; the error propagates only when no snapshot exists
    /// at all.
    pub async fn fetch(&self, stops: &StopSet) -> Result<Arc<MonitorResponse>, ApiError> {
        let key = stops.query_key();

        if let Some(entry) = self.cache.get(&key).await {
            let age = entry.fetched_at.elapsed();
            if age < self.cache_ttl {
                self.sink.emit(PipelineEvent::CacheHit {
                    key: key.clone(),
                    age,
                });
                return Ok(entry.response.clone());
            }
        }
        self.sink.emit(PipelineEvent::CacheMiss { key: key.clone() });

        match self.fetch_network(stops, &key).await {
            Ok(response) => Ok(response),
            Err(err) => {
                if let Some(entry) = self.cache.get(&key).await {
                    self.sink.emit(PipelineEvent::CacheFallback {
                        key,
                        error: err.to_string(),
                    });
                    Ok(entry.response.clone())
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Run the attempt loop: retry timeouts with exponential backoff, give
    /// up immediately on any other failure.
    async fn fetch_network(
        &self,
        stops: &StopSet,
        key: &str,
    ) -> Result<Arc<MonitorResponse>, ApiError> {
        let mut query: Vec<(&str, String)> = stops.iter().map(|id| ("rbl", id.to_string())).collect();
        query.push(("activateTrafficInfo", TRAFFIC_INFO.to_string()));

        let mut attempt = 1;
        loop {
            self.sink.emit(PipelineEvent::FetchAttempt {
                attempt,
                stop_count: stops.len(),
            });

            match self.request(&query).await {
                Ok(mut response) => {
                    if let Some(data) = response.data.as_mut() {
                        data.monitors = merge_monitors(std::mem::take(&mut data.monitors));
                    }

                    let response = Arc::new(response);
                    let entry = Arc::new(CachedSnapshot {
                        response: response.clone(),
                        fetched_at: Instant::now(),
                    });
                    self.cache.insert(key.to_string(), entry).await;

                    return Ok(response);
                }
                Err(err) if err.is_timeout() && attempt < self.retry_count => {
                    let delay = self.retry_base_delay * 2u32.pow(attempt - 1);
                    self.sink.emit(PipelineEvent::FetchRetry { attempt, delay });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_timeout() => {
                    return Err(ApiError::Timeout { attempts: attempt });
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One request/deserialize round trip.
    async fn request(&self, query: &[(&str, String)]) -> Result<MonitorResponse, ApiError> {
        let response = self.http.get(&self.base_url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ApiError::Json {
            message: format!("{e} (body: {})", body.chars().take(200).collect::<String>()),
        })
    }
}

/// Collapse duplicate monitor blocks sharing one rbl.
///
/// The first-seen block keeps its location and attributes; line lists are
/// concatenated in feed order. Blocks without an rbl or without any lines
/// are dropped. First-appearance order of stops is preserved.
pub(crate) fn merge_monitors(monitors: Vec<RawMonitor>) -> Vec<RawMonitor> {
    let mut order: Vec<u32> = Vec::new();
    let mut merged: HashMap<u32, RawMonitor> = HashMap::new();

    for monitor in monitors {
        let Some(rbl) = monitor.rbl() else {
            continue;
        };
        if monitor.lines.is_empty() {
            continue;
        }

        match merged.entry(rbl) {
            Entry::Occupied(mut existing) => existing.get_mut().lines.extend(monitor.lines),
            Entry::Vacant(slot) => {
                order.push(rbl);
                slot.insert(monitor);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|rbl| merged.remove(&rbl))
        .collect()
}
