//! Core foundation layer.
//!
//! Plain value types shared by every other module. No internal
//! dependencies.
//!
//! # Contents
//!
//! - [`math`]: angle normalization and pixel-space headings
//! - [`Point2D`], [`PixelPoint`], [`GeoPoint`]: the three coordinate spaces
//! - [`MapPose`], [`Quaternion`]: yaw-only poses
//! - [`Bounds`]: planar bounding boxes (map extent, viewports)
//! - [`TelemetrySample`]: coordinate plus optional timestamp

pub mod math;

mod bounds;
mod point;
mod pose;
mod sample;

pub use bounds::Bounds;
pub use point::{GeoPoint, PixelPoint, Point2D, TrackCoordinate};
pub use pose::{MapPose, Quaternion};
pub use sample::TelemetrySample;
