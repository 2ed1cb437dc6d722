//! Construction-time parameters of the HTTP client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Header carrying the request's send time (epoch millis), echoed on the
/// response for latency tracing.
pub const DEFAULT_CORRELATION_HEADER: &str = "x-inside-request-time";

/// Largest response body buffered in memory by default (5 MiB).
pub const DEFAULT_MAX_IN_MEMORY_SIZE: usize = 5 * 1024 * 1024;

/// Pool and request settings.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Maximum concurrent requests, and idle connections kept per host.
    pub max_connections: usize,
    /// Seconds an idle pooled connection is kept open.
    pub max_idle_time_secs: u64,
    /// Maximum requests waiting for a free connection before new ones are rejected.
    pub pending_acquire_max_count: usize,
    /// Accept and transparently decode gzip responses.
    pub compression: bool,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Maximum response body size in bytes.
    pub max_in_memory_size: usize,
    pub correlation_header: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self {
            max_connections: 10 * cores,
            max_idle_time_secs: 60,
            pending_acquire_max_count: 100_000,
            compression: true,
            request_timeout_secs: 30,
            max_in_memory_size: DEFAULT_MAX_IN_MEMORY_SIZE,
            correlation_header: DEFAULT_CORRELATION_HEADER.to_string(),
        }
    }
}

impl HttpClientConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn max_idle_time(&self) -> Duration {
        Duration::from_secs(self.max_idle_time_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
