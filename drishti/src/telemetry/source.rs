//! Contracts for where telemetry comes from.
//!
//! The engine never talks to a network itself. It depends on two
//! capabilities:
//!
//! - [`TelemetryBackend`]: the REST side (latest snapshot, history window)
//! - [`PositionStream`]: the incremental event feed
//!
//! Reconnection and backoff belong to the stream implementation. The
//! engine only sees [`StreamEvent::Connected`] / [`StreamEvent::Disconnected`]
//! transitions.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::CancelToken;

use super::record::PositionRecord;

/// Event name the backend uses for position pushes.
pub const POSITION_EVENT: &str = "robot:position";

/// Default robot identifier used by the backend.
pub const DEFAULT_ROBOT_ID: &str = "robot_1";

/// Default history limit used by the backend.
pub const DEFAULT_HISTORY_LIMIT: u32 = 200;

/// Time bounds of a history fetch, epoch milliseconds, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub since_ms: Option<u64>,
    pub until_ms: Option<u64>,
}

impl HistoryWindow {
    pub fn new(since_ms: Option<u64>, until_ms: Option<u64>) -> Self {
        Self { since_ms, until_ms }
    }

    /// Window covering the `span_ms` milliseconds up to `now_ms`.
    pub fn trailing(now_ms: u64, span_ms: u64) -> Self {
        Self {
            since_ms: Some(now_ms.saturating_sub(span_ms)),
            until_ms: Some(now_ms),
        }
    }

    /// Whether a timestamp falls inside the window.
    pub fn contains(&self, ts_ms: u64) -> bool {
        self.since_ms.is_none_or(|s| ts_ms >= s) && self.until_ms.is_none_or(|u| ts_ms <= u)
    }
}

/// Parameters of a history request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub robot_id: String,
    #[serde(flatten)]
    pub window: HistoryWindow,
    /// Maximum number of (newest) records to return
    pub limit: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            robot_id: DEFAULT_ROBOT_ID.to_string(),
            window: HistoryWindow::default(),
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl HistoryQuery {
    pub fn new(robot_id: impl Into<String>) -> Self {
        Self {
            robot_id: robot_id.into(),
            ..Self::default()
        }
    }

    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// `robot_id=…&since_ms=…&until_ms=…&limit=…`, omitting unset bounds.
    pub fn to_query_string(&self) -> String {
        let mut parts = vec![format!("robot_id={}", encode_component(&self.robot_id))];
        if let Some(since) = self.window.since_ms {
            parts.push(format!("since_ms={}", since));
        }
        if let Some(until) = self.window.until_ms {
            parts.push(format!("until_ms={}", until));
        }
        parts.push(format!("limit={}", self.limit));
        parts.join("&")
    }

    /// Full history URL under a backend base URL.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/api/telemetry/history?{}",
            base_url.trim_end_matches('/'),
            self.to_query_string()
        )
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// REST side of the telemetry backend.
///
/// Implementations should return `Err(Cancelled)` promptly once the token
/// is cancelled. Callers re-check the token before using a result anyway.
pub trait TelemetryBackend: Send + Sync {
    /// Most recent known position, `None` when the backend has none.
    fn latest(&self, cancel: &CancelToken) -> Result<Option<PositionRecord>>;

    /// Records inside the query window, oldest first, at most `limit`
    /// (the newest ones when the window holds more).
    fn history(&self, query: &HistoryQuery, cancel: &CancelToken) -> Result<Vec<PositionRecord>>;
}

/// Something delivered by a [`PositionStream`].
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A position push
    Position(PositionRecord),
    /// Transport (re)connected
    Connected,
    /// Transport dropped; it may reconnect on its own
    Disconnected(Option<String>),
}

impl StreamEvent {
    /// Transport-level event name.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Position(_) => POSITION_EVENT,
            StreamEvent::Connected => "connect",
            StreamEvent::Disconnected(_) => "disconnect",
        }
    }
}

/// Handler invoked for every stream event, possibly on a transport thread.
pub type EventHandler = Box<dyn Fn(StreamEvent) + Send + Sync + 'static>;

/// Incremental position feed.
pub trait PositionStream: Send + Sync {
    /// Start delivering events to `on_event` until the returned
    /// [`Subscription`] is closed.
    fn subscribe(&self, on_event: EventHandler) -> Result<Subscription>;
}

/// Handle to an active stream subscription.
///
/// After [`Subscription::unsubscribe`] returns (or the handle is dropped)
/// the handler receives no further events.
#[must_use = "dropping a Subscription closes it immediately"]
pub struct Subscription {
    close: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap the closing action of a stream implementation.
    pub fn new(close: impl FnOnce() + Send + 'static) -> Self {
        Self {
            close: Some(Box::new(close)),
        }
    }

    /// Close the subscription.
    pub fn unsubscribe(mut self) {
        self.close_now();
    }

    fn close_now(&mut self) {
        if let Some(close) = self.close.take() {
            close();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("open", &self.close.is_some())
            .finish()
    }
}
