//! I/O adapters around the engine's contracts.
//!
//! - [`channel_stream`]: crossbeam-backed [`crate::telemetry::PositionStream`]
//! - [`replay`]: file-backed [`crate::telemetry::TelemetryBackend`]
//! - [`overlay`]: SVG export of map, track and poses
//! - [`publisher`]: JSON-lines goal publisher

pub mod channel_stream;
pub mod overlay;
pub mod publisher;
pub mod replay;

pub use channel_stream::{ChannelPositionStream, StreamFeed, channel_stream};
pub use overlay::SvgOverlay;
pub use publisher::JsonlPublisher;
pub use replay::ReplayBackend;
