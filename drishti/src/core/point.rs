//! Point types for the three coordinate spaces the console deals with.
//!
//! - [`PixelPoint`]: rendered-image pixels, origin top-left, y down
//! - [`Point2D`]: metric map frame, y up
//! - [`GeoPoint`]: WGS84 latitude/longitude from the GNSS telemetry feed

use serde::{Deserialize, Serialize};

/// A 2D point in the metric map frame (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate in meters
    pub x: f64,
    /// Y coordinate in meters
    pub y: f64,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Both coordinates are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A point in rendered-image pixel space.
///
/// Relative to the top-left corner of the element as laid out on screen,
/// which may be scaled independently of the backing image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column, increasing to the right
    pub px: f64,
    /// Row, increasing downward
    pub py: f64,
}

impl PixelPoint {
    /// Create a new pixel point.
    #[inline]
    pub fn new(px: f64, py: f64) -> Self {
        Self { px, py }
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A coordinate that can be stored in a trajectory.
///
/// Equality is exact (used for adjacent deduplication); `planar` gives the
/// horizontal/vertical pair used for bounding boxes and drawing.
pub trait TrackCoordinate: Copy + PartialEq + std::fmt::Debug + Send + 'static {
    /// (horizontal, vertical) components, vertical increasing upward.
    fn planar(&self) -> (f64, f64);
}

impl TrackCoordinate for Point2D {
    #[inline]
    fn planar(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl TrackCoordinate for GeoPoint {
    #[inline]
    fn planar(&self) -> (f64, f64) {
        (self.lng, self.lat)
    }
}
