//! Axis-aligned bounding box in planar coordinates.
//!
//! [`Bounds`] is used for two things:
//! - the metric extent of a loaded map (see [`crate::frame::MapFrame::extent`])
//! - the viewport fitted around a trajectory, in whatever planar space the
//!   trajectory's coordinates live in (`(x, y)` or `(lng, lat)`)
//!
//! # Usage
//!
//! ```rust
//! use drishti::core::{Bounds, Point2D};
//!
//! let mut bounds = Bounds::empty();
//! bounds.expand_to_include(Point2D::new(1.0, 1.0));
//! bounds.expand_to_include(Point2D::new(-2.0, 3.0));
//! assert_eq!(bounds.min, Point2D::new(-2.0, 1.0));
//! assert_eq!(bounds.max, Point2D::new(1.0, 3.0));
//! ```

use serde::{Deserialize, Serialize};

use super::point::{Point2D, TrackCoordinate};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner (smallest x and y values).
    pub min: Point2D,
    /// Maximum corner (largest x and y values).
    pub max: Point2D,
}

impl Bounds {
    /// Create a new bounding box from min and max corners.
    #[inline]
    pub const fn new(min: Point2D, max: Point2D) -> Self {
        Self { min, max }
    }

    /// Create an empty bounding box.
    ///
    /// The empty bounds has min > max, so it will expand to fit any point.
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: Point2D::new(f64::INFINITY, f64::INFINITY),
            max: Point2D::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing every coordinate's planar projection.
    pub fn from_coordinates<'a, C, I>(coords: I) -> Self
    where
        C: TrackCoordinate,
        I: IntoIterator<Item = &'a C>,
    {
        let mut bounds = Self::empty();
        for c in coords {
            let (h, v) = c.planar();
            bounds.expand_to_include(Point2D::new(h, v));
        }
        bounds
    }

    /// Check if the bounds are empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Check if a point is inside the bounding box (edges inclusive).
    #[inline]
    pub fn contains(&self, point: Point2D) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Smallest box containing both.
    #[inline]
    pub fn union(&self, other: &Bounds) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: Point2D::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2D::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Expand bounds to include a point.
    #[inline]
    pub fn expand_to_include(&mut self, point: Point2D) {
        self.min = Point2D::new(self.min.x.min(point.x), self.min.y.min(point.y));
        self.max = Point2D::new(self.max.x.max(point.x), self.max.y.max(point.y));
    }

    /// Grow each side by `ratio` of the box's extent along that axis.
    ///
    /// A degenerate axis (zero extent) is grown by `min_margin` instead so a
    /// straight horizontal or vertical track still gets a visible frame.
    pub fn pad(&self, ratio: f64, min_margin: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        let mx = margin(self.width(), ratio, min_margin);
        let my = margin(self.height(), ratio, min_margin);
        Self {
            min: Point2D::new(self.min.x - mx, self.min.y - my),
            max: Point2D::new(self.max.x + mx, self.max.y + my),
        }
    }
}

fn margin(extent: f64, ratio: f64, min_margin: f64) -> f64 {
    if extent > 0.0 {
        extent * ratio
    } else {
        min_margin
    }
}
