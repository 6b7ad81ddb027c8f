//! Drishti - Map frame, pose capture and live trajectory engine for the
//! VacuumTiger operator console
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                       io/                           │  ← Adapters
//! │     (channel stream, replay, svg overlay, jsonl)    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │              session/     mission/                  │  ← Orchestration
//! │        (live view, cancel)  (goal, schedule)        │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │        frame/     capture/     telemetry/   state/  │  ← Engine
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      core/                          │  ← Foundation
//! │          (points, poses, bounds, samples)           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Coordinate spaces
//!
//! - **Rendered pixels**: where the operator clicked, origin top-left
//! - **Image pixels**: the map image at native size, origin top-left
//! - **Map meters**: metric frame, origin bottom-left, y up
//! - **Geographic**: lat/lng tracks, drawn with lng horizontal
//!
//! [`frame::MapFrame`] converts between the first three.
//!
//! # Quick start
//!
//! ```no_run
//! use drishti::capture::{ActivationChannel, ChannelBindings, PoseCapture};
//! use drishti::core::PixelPoint;
//! use drishti::frame::{MapDescriptor, MapFrame, RenderSize};
//!
//! let frame = MapFrame::new(MapDescriptor::new(0.0, 0.0, 0.05, 800, 600)?)?;
//! let mut capture = PoseCapture::new(frame, ChannelBindings::default());
//! let rendered = RenderSize::new(400.0, 300.0);
//!
//! capture.press(ActivationChannel::Primary, PixelPoint::new(200.0, 150.0), rendered);
//! capture.drag(PixelPoint::new(250.0, 100.0), rendered);
//! capture.release();
//!
//! let goal = capture.snapshot().goal;
//! # Ok::<(), drishti::DrishtiError>(())
//! ```

pub mod capture;
pub mod config;
pub mod core;
pub mod error;
pub mod frame;
pub mod io;
pub mod mission;
pub mod session;
pub mod state;
pub mod telemetry;

pub use config::DrishtiConfig;
pub use error::{DrishtiError, Result};

pub use capture::{ActivationChannel, ChannelBindings, PoseCapture, PoseSnapshot, PoseTarget};
pub use crate::core::{Bounds, GeoPoint, MapPose, PixelPoint, Point2D, Quaternion, TelemetrySample};
pub use frame::{MapDescriptor, MapFrame, MapLoadState, RenderSize};
pub use session::{CancelToken, LiveView, LiveViewSettings};
pub use state::{ConsoleContext, ContextStore};
pub use telemetry::{PositionRecord, Trajectory};
