//! Map metadata as served by the map-info endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{DrishtiError, Result};

/// Geometry of the occupancy image backing the map view.
///
/// `origin_x`/`origin_y` are the metric coordinates of the image's
/// lower-left corner (pixel `(0, height)`). The image's top row is the
/// map's largest y.
///
/// Both `origin_x` and `originX` spellings are accepted when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapDescriptor {
    /// Metric x of the lower-left corner
    #[serde(alias = "originX")]
    pub origin_x: f64,
    /// Metric y of the lower-left corner
    #[serde(alias = "originY")]
    pub origin_y: f64,
    /// Meters per image pixel
    pub resolution: f64,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl MapDescriptor {
    /// Create and validate a descriptor.
    pub fn new(origin_x: f64, origin_y: f64, resolution: f64, width: u32, height: u32) -> Result<Self> {
        let d = Self {
            origin_x,
            origin_y,
            resolution,
            width,
            height,
        };
        d.validate()?;
        Ok(d)
    }

    /// Decode a descriptor from the map-info JSON body and validate it.
    pub fn from_json(body: &str) -> Result<Self> {
        let d: Self = serde_json::from_str(body)?;
        d.validate()?;
        Ok(d)
    }

    /// Check the invariants every transform relies on.
    pub fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(DrishtiError::InvalidMap(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(DrishtiError::InvalidMap(format!(
                "image dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.origin_x.is_finite() && self.origin_y.is_finite()) {
            return Err(DrishtiError::InvalidMap("origin must be finite".to_string()));
        }
        Ok(())
    }

    /// Metric width of the map.
    #[inline]
    pub fn metric_width(&self) -> f64 {
        self.width as f64 * self.resolution
    }

    /// Metric height of the map.
    #[inline]
    pub fn metric_height(&self) -> f64 {
        self.height as f64 * self.resolution
    }
}
