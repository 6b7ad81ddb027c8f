//! Telemetry: position records, sources, trajectory and current position.
//!
//! - [`record`]: lenient decoding of position records
//! - [`source`]: backend and stream contracts, history queries
//! - [`Trajectory`]: history + live track with adjacent dedup
//! - [`LivePositionTracker`]: last-write-wins current position

pub mod record;
pub mod source;

mod tracker;
mod trajectory;

pub use record::{Decoded, PositionRecord, RecordCoordinate};
pub use source::{
    EventHandler, HistoryQuery, HistoryWindow, POSITION_EVENT, PositionStream, StreamEvent,
    Subscription, TelemetryBackend,
};
pub use tracker::{LivePosition, LivePositionTracker, PositionSource};
pub use trajectory::{
    HistoryMergePolicy, LoadOutcome, PointOrigin, TrackPoint, Trajectory, ViewportPadding,
};
