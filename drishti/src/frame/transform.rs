//! Pixel ⇄ metric conversion for one loaded map.
//!
//! Three pixel spaces are involved:
//!
//! - **rendered**: the element as laid out on screen, any size
//! - **image**: the backing image's native pixels (`width × height`)
//! - **fraction**: image position divided by image size, 0–1
//!
//! Rendered coordinates are rescaled to image coordinates before any metric
//! conversion, so the metric result does not depend on how large the map is
//! drawn.

use crate::core::{Bounds, PixelPoint, Point2D};
use crate::error::{DrishtiError, Result};

use super::descriptor::MapDescriptor;

/// On-screen size of the rendered map element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSize {
    pub width: f64,
    pub height: f64,
}

impl RenderSize {
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Stateless transform bound to a validated [`MapDescriptor`].
///
/// Cheap to copy; share it freely between capture and overlay code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFrame {
    descriptor: MapDescriptor,
}

impl MapFrame {
    /// Build a transform, rejecting descriptors that violate invariants.
    pub fn new(descriptor: MapDescriptor) -> Result<Self> {
        descriptor.validate()?;
        Ok(Self { descriptor })
    }

    #[inline]
    pub fn descriptor(&self) -> &MapDescriptor {
        &self.descriptor
    }

    /// Image pixel under a rendered-pixel position.
    ///
    /// Returns `None` outside `[0, rendered.width] × [0, rendered.height]`
    /// (edges inclusive) or when the rendered size is unusable.
    pub fn rendered_to_image(&self, pixel: PixelPoint, rendered: RenderSize) -> Option<PixelPoint> {
        let in_x = pixel.px >= 0.0 && pixel.px <= rendered.width;
        let in_y = pixel.py >= 0.0 && pixel.py <= rendered.height;
        if !(in_x && in_y) {
            return None;
        }
        self.scale_to_image(pixel, rendered)
    }

    /// Rescale a rendered-pixel position to image pixels without a bounds
    /// check. `None` only when the rendered size is unusable.
    pub fn scale_to_image(&self, pixel: PixelPoint, rendered: RenderSize) -> Option<PixelPoint> {
        if !rendered.is_valid() {
            return None;
        }
        let sx = self.descriptor.width as f64 / rendered.width;
        let sy = self.descriptor.height as f64 / rendered.height;
        Some(PixelPoint::new(pixel.px * sx, pixel.py * sy))
    }

    /// Metric point under an image pixel. No bounds check.
    #[inline]
    pub fn image_to_map(&self, image: PixelPoint) -> Point2D {
        let d = &self.descriptor;
        Point2D::new(
            d.origin_x + image.px * d.resolution,
            d.origin_y + (d.height as f64 - image.py) * d.resolution,
        )
    }

    /// Metric point under a rendered-pixel position, or `None` when the
    /// position falls outside the rendered element. Out-of-bounds input is
    /// rejected, never clamped.
    pub fn pixel_to_map(&self, pixel: PixelPoint, rendered: RenderSize) -> Option<Point2D> {
        self.rendered_to_image(pixel, rendered)
            .map(|image| self.image_to_map(image))
    }

    /// Image pixel of a metric point (may lie outside the image).
    #[inline]
    pub fn map_to_image_pixel(&self, point: Point2D) -> PixelPoint {
        let d = &self.descriptor;
        PixelPoint::new(
            (point.x - d.origin_x) / d.resolution,
            d.height as f64 - (point.y - d.origin_y) / d.resolution,
        )
    }

    /// Fractional `(left, top)` position of a metric point for overlay
    /// placement; inside the image both lie in 0–1.
    #[inline]
    pub fn map_to_pixel_fraction(&self, point: Point2D) -> (f64, f64) {
        let image = self.map_to_image_pixel(point);
        (
            image.px / self.descriptor.width as f64,
            image.py / self.descriptor.height as f64,
        )
    }

    /// Rendered-pixel position of a metric point for a given element size.
    #[inline]
    pub fn map_to_rendered_pixel(&self, point: Point2D, rendered: RenderSize) -> PixelPoint {
        let (left, top) = self.map_to_pixel_fraction(point);
        PixelPoint::new(left * rendered.width, top * rendered.height)
    }

    /// Metric area covered by the image.
    pub fn extent(&self) -> Bounds {
        let d = &self.descriptor;
        Bounds::new(
            Point2D::new(d.origin_x, d.origin_y),
            Point2D::new(d.origin_x + d.metric_width(), d.origin_y + d.metric_height()),
        )
    }

    /// Check that a decoded map image matches the descriptor.
    pub fn verify_image_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if width != self.descriptor.width || height != self.descriptor.height {
            return Err(DrishtiError::InvalidMap(format!(
                "image is {}x{}, descriptor expects {}x{}",
                width, height, self.descriptor.width, self.descriptor.height
            )));
        }
        Ok(())
    }
}

/// Screen rotation in degrees for a glyph pointing right at zero heading.
///
/// Screen rotation is clockwise-positive while yaw is counter-clockwise
/// positive, hence the sign flip.
#[inline]
pub fn heading_to_screen_rotation(yaw: f64) -> f64 {
    -yaw.to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn frame() -> MapFrame {
        MapFrame::new(MapDescriptor::new(0.0, 0.0, 0.05, 800, 600).unwrap()).unwrap()
    }

    #[test]
    fn test_center_pixel_at_native_size() {
        let p = frame()
            .pixel_to_map(PixelPoint::new(400.0, 300.0), RenderSize::new(800.0, 600.0))
            .unwrap();
        assert_relative_eq!(p.x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_top_left_is_max_y() {
        let p = frame()
            .pixel_to_map(PixelPoint::new(0.0, 0.0), RenderSize::new(800.0, 600.0))
            .unwrap();
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_edges_inclusive() {
        let f = frame();
        let r = RenderSize::new(400.0, 300.0);
        assert!(f.pixel_to_map(PixelPoint::new(400.0, 300.0), r).is_some());
        assert!(f.pixel_to_map(PixelPoint::new(400.01, 0.0), r).is_none());
        assert!(f.pixel_to_map(PixelPoint::new(0.0, -0.01), r).is_none());
    }

    #[test]
    fn test_invalid_render_size() {
        let f = frame();
        assert!(f.pixel_to_map(PixelPoint::new(0.0, 0.0), RenderSize::new(0.0, 10.0)).is_none());
        assert!(f.pixel_to_map(PixelPoint::new(0.0, 0.0), RenderSize::new(10.0, f64::NAN)).is_none());
    }

    #[test]
    fn test_nan_pixel_rejected() {
        let r = RenderSize::new(800.0, 600.0);
        assert!(frame().pixel_to_map(PixelPoint::new(f64::NAN, 1.0), r).is_none());
    }

    #[test]
    fn test_rendered_pixel_inverse() {
        let f = frame();
        let r = RenderSize::new(200.0, 150.0);
        let p = f.pixel_to_map(PixelPoint::new(37.0, 121.0), r).unwrap();
        let back = f.map_to_rendered_pixel(p, r);
        assert_relative_eq!(back.px, 37.0, epsilon = 1e-9);
        assert_relative_eq!(back.py, 121.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extent() {
        let e = MapFrame::new(MapDescriptor::new(-10.0, -5.0, 0.1, 200, 100).unwrap())
            .unwrap()
            .extent();
        assert_relative_eq!(e.min.x, -10.0);
        assert_relative_eq!(e.max.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(e.max.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_verify_image_dimensions() {
        let f = frame();
        assert!(f.verify_image_dimensions(800, 600).is_ok());
        assert!(matches!(
            f.verify_image_dimensions(600, 800),
            Err(DrishtiError::InvalidMap(_))
        ));
    }

    #[test]
    fn test_screen_rotation() {
        assert_relative_eq!(heading_to_screen_rotation(FRAC_PI_2), -90.0, epsilon = 1e-9);
        assert_relative_eq!(heading_to_screen_rotation(-FRAC_PI_2), 90.0, epsilon = 1e-9);
        assert_relative_eq!(heading_to_screen_rotation(0.0), 0.0);
    }
}
