//! Angle helpers for map-frame headings.
//!
//! Headings follow the map convention: radians, counter-clockwise positive
//! from the +X (screen-right) axis, normalized to the half-open range (-π, π].

use std::f64::consts::PI;

/// Normalize angle to (-π, π].
///
/// `-π` maps to `π`, so a heading pointing straight left is always reported
/// as `π` regardless of which side of the cut it was computed on.
///
/// # Example
/// ```
/// use drishti::core::math::normalize_angle;
/// use std::f64::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-9);
/// assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
/// ```
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// Heading of the vector `(dx, dy)` given in y-down pixel space.
///
/// Pixel rows grow downward while map y grows upward, so the vertical
/// component is flipped before `atan2`.
#[inline]
pub fn pixel_heading(dx: f64, dy: f64) -> f64 {
    normalize_angle((-dy).atan2(dx))
}

/// Shortest angular difference from angle `a` to angle `b`.
#[inline]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    normalize_angle(b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_normalize_angle_zero() {
        assert_relative_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn test_normalize_angle_half_open() {
        assert_relative_eq!(normalize_angle(PI), PI);
        assert_relative_eq!(normalize_angle(-PI), PI);
    }

    #[test]
    fn test_normalize_angle_wrap() {
        assert_relative_eq!(normalize_angle(2.0 * PI), 0.0, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(3.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-3.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(PI + 0.1), -PI + 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_pixel_heading_quadrants() {
        // Up-right on screen is up-right on the map
        assert_relative_eq!(pixel_heading(50.0, -50.0), FRAC_PI_4, epsilon = 1e-12);
        // Straight left is +π, never -π
        assert_relative_eq!(pixel_heading(-50.0, 0.0), PI, epsilon = 1e-12);
        assert_relative_eq!(pixel_heading(-50.0, -0.0), PI, epsilon = 1e-12);
        // Down on screen is -π/2 on the map
        assert_relative_eq!(pixel_heading(0.0, 10.0), -PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_diff_crossing_pi() {
        assert_relative_eq!(angle_diff(PI - 0.1, -PI + 0.1), 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_handles_nan() {
        assert!(normalize_angle(f64::NAN).is_nan());
    }
}
