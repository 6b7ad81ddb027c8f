//! Timestamped telemetry sample.

use serde::{Deserialize, Serialize};

/// A coordinate with an optional timestamp.
///
/// Timestamps are milliseconds since the Unix epoch (matches the backend's
/// `since_ms`/`until_ms` query parameters). A record whose timestamp could
/// not be parsed is still usable as a position, so the field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample<P> {
    /// The reported position
    pub position: P,
    /// Milliseconds since epoch, when known
    pub timestamp_ms: Option<u64>,
}

impl<P> TelemetrySample<P> {
    /// Create a sample with a known timestamp.
    #[inline]
    pub fn new(position: P, timestamp_ms: u64) -> Self {
        Self {
            position,
            timestamp_ms: Some(timestamp_ms),
        }
    }

    /// Create a sample without a timestamp.
    #[inline]
    pub fn untimed(position: P) -> Self {
        Self {
            position,
            timestamp_ms: None,
        }
    }

    /// Map the position while preserving the timestamp.
    #[inline]
    pub fn map<U, F: FnOnce(P) -> U>(self, f: F) -> TelemetrySample<U> {
        TelemetrySample {
            position: f(self.position),
            timestamp_ms: self.timestamp_ms,
        }
    }
}
