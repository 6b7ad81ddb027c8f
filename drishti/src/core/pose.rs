//! Map-frame poses with yaw-only orientation.

use serde::{Deserialize, Serialize};

use super::math::normalize_angle;
use super::point::Point2D;

/// Unit quaternion `(x, y, z, w)`.
///
/// Only rotations about the vertical axis are produced by this crate, so
/// `x` and `y` are always zero for quaternions built with [`Quaternion::from_yaw`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// Identity rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Pure yaw rotation: `z = sin(yaw/2)`, `w = cos(yaw/2)`.
    #[inline]
    pub fn from_yaw(yaw: f64) -> Self {
        let (s, c) = (yaw * 0.5).sin_cos();
        Self {
            x: 0.0,
            y: 0.0,
            z: s,
            w: c,
        }
    }

    /// Recover the yaw angle, normalized to (-π, π].
    ///
    /// Assumes a yaw-only quaternion; roll and pitch components are ignored.
    #[inline]
    pub fn yaw(&self) -> f64 {
        normalize_angle(2.0 * self.z.atan2(self.w))
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A pose in the metric map frame.
///
/// The orientation quaternion is derived from `yaw` on every mutation, so
/// the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPose {
    /// X position in meters
    pub x: f64,
    /// Y position in meters
    pub y: f64,
    /// Heading in radians, normalized to (-π, π]
    yaw: f64,
    /// Yaw-only orientation
    orientation: Quaternion,
}

impl MapPose {
    /// Create a new pose with yaw normalized to (-π, π].
    #[inline]
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        let yaw = normalize_angle(yaw);
        Self {
            x,
            y,
            yaw,
            orientation: Quaternion::from_yaw(yaw),
        }
    }

    /// Pose at a position with zero heading.
    #[inline]
    pub fn at(position: Point2D) -> Self {
        Self::new(position.x, position.y, 0.0)
    }

    /// Heading in radians.
    #[inline]
    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Orientation quaternion matching [`MapPose::yaw`].
    #[inline]
    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    /// Position component.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Same position with a new heading.
    #[inline]
    pub fn with_yaw(&self, yaw: f64) -> Self {
        Self::new(self.x, self.y, yaw)
    }
}
