//! Structured pipeline events.
//!
//! The client and normalizer report what they are doing through an injected
//! sink instead of a global logger. Events fire at well-defined points
//! (fetch attempt, cache hit/miss, skipped monitor or line) and are never
//! required for correctness. The default sink forwards to `tracing`; tests
//! inject a recording sink and assert on what was emitted.

use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

/// One observation point in the fetch/normalize pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A network attempt is starting.
    FetchAttempt { attempt: u32, stop_count: usize },

    /// A timed-out attempt will be retried after `delay`.
    FetchRetry { attempt: u32, delay: Duration },

    /// A fresh cache entry short-circuited the network call.
    CacheHit { key: String, age: Duration },

    /// No fresh cache entry; going to the network.
    CacheMiss { key: String },

    /// The network failed but a cached snapshot (of any age) was served.
    CacheFallback { key: String, error: String },

    /// A monitor block failed validation and was skipped.
    MonitorSkipped { rbl: Option<u32>, reason: String },

    /// A line block failed validation and was skipped.
    LineSkipped {
        rbl: u32,
        line: Option<String>,
        reason: String,
    },
}

/// Receiver for pipeline events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Default sink: maps events onto `tracing` levels. Retries, fallbacks and
/// skips are warnings; the rest is debug noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::FetchAttempt {
                attempt,
                stop_count,
            } => debug!(attempt, stop_count, "fetching monitors"),
            PipelineEvent::FetchRetry { attempt, delay } => {
                warn!(attempt, ?delay, "request timed out, retrying");
            }
            PipelineEvent::CacheHit { key, age } => debug!(%key, ?age, "cache hit"),
            PipelineEvent::CacheMiss { key } => debug!(%key, "cache miss"),
            PipelineEvent::CacheFallback { key, error } => {
                warn!(%key, %error, "serving cached snapshot after fetch failure");
            }
            PipelineEvent::MonitorSkipped { rbl, reason } => {
                warn!(?rbl, %reason, "skipping monitor");
            }
            PipelineEvent::LineSkipped { rbl, line, reason } => {
                warn!(rbl, ?line, %reason, "skipping line");
            }
        }
    }
}

/// Sink that records every event for later inspection. Test support.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: PipelineEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
