//! Execution timing checkpoints.
//!
//! Elapsed time is always measured on the monotonic clock from the moment an
//! execution starts. Intermediate checkpoints are optional and only used for
//! diagnostics.

use std::time::{Duration, Instant};

/// Timing checkpoints collected during one execution.
#[derive(Debug, Clone)]
pub struct TimingCheckpoints {
    /// When the execution started.
    pub request_start: Instant,

    /// When the response head arrived.
    pub headers_received: Option<Instant>,

    /// When the execution settled (body read, failure or cancellation).
    pub settled: Option<Instant>,
}

impl TimingCheckpoints {
    /// Starts the clock.
    pub fn start() -> Self {
        Self {
            request_start: Instant::now(),
            headers_received: None,
            settled: None,
        }
    }

    /// Records when the response head was received.
    pub fn mark_headers_received(&mut self) {
        self.headers_received = Some(Instant::now());
    }

    /// Records settlement. Later calls keep the first instant.
    pub fn mark_settled(&mut self) {
        if self.settled.is_none() {
            self.settled = Some(Instant::now());
        }
    }

    /// Time from start to settlement, or to now if not yet settled.
    pub fn elapsed(&self) -> Duration {
        self.settled
            .unwrap_or_else(Instant::now)
            .duration_since(self.request_start)
    }

    /// [`elapsed`](Self::elapsed) in whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Time spent waiting for the response head.
    pub fn time_to_headers(&self) -> Option<Duration> {
        self.headers_received
            .map(|at| at.duration_since(self.request_start))
    }

    /// Time spent reading the body after the head arrived.
    pub fn download(&self) -> Option<Duration> {
        match (self.headers_received, self.settled) {
            (Some(head), Some(done)) => Some(done.duration_since(head)),
            _ => None,
        }
    }
}

/// Formats checkpoints as `Headers: 12ms | Download: 3ms | Total: 15ms`.
///
/// Phases that were never reached are omitted.
pub fn format_timing_compact(timing: &TimingCheckpoints) -> String {
    let mut parts = Vec::new();
    if let Some(head) = timing.time_to_headers() {
        parts.push(format!("Headers: {}ms", head.as_millis()));
    }
    if let Some(download) = timing.download() {
        parts.push(format!("Download: {}ms", download.as_millis()));
    }
    parts.push(format!("Total: {}ms", timing.elapsed_ms()));
    parts.join(" | ")
}
