//! SVG export of the map overlay for inspection and audits.
//!
//! Draws, in image-pixel space:
//! - the map extent (light gray frame)
//! - the trajectory polyline (blue)
//! - the current position (vermillion dot)
//! - goal and initial pose glyphs (green / orange arrows), rotated with
//!   [`heading_to_screen_rotation`]
//! - the fitted viewport, when one exists (dashed)

use std::path::Path;

use svg::Document;
use svg::node::element::{Circle, Group, Path as SvgPath, Polyline, Rectangle};

use crate::capture::PoseTarget;
use crate::core::{Bounds, MapPose, Point2D, TrackCoordinate};
use crate::error::Result;
use crate::frame::{MapFrame, heading_to_screen_rotation};
use crate::telemetry::Trajectory;

/// Colorblind-friendly palette (Okabe-Ito).
mod colors {
    pub const MAP_EXTENT: &str = "#BBBBBB";
    pub const TRAJECTORY: &str = "#0072B2";
    pub const CURRENT: &str = "#D55E00";
    pub const GOAL: &str = "#009E73";
    pub const INITIAL: &str = "#E69F00";
    pub const VIEWPORT: &str = "#56B4E9";
}

/// Glyph length in output pixels.
const GLYPH_SIZE: f64 = 14.0;

#[derive(Debug, Clone, Copy)]
enum Projection {
    /// Metric coordinates through a loaded map
    Map { frame: MapFrame, scale: f64 },
    /// Arbitrary planar coordinates fitted into a canvas
    Planar { bounds: Bounds, scale: f64 },
}

impl Projection {
    fn project(&self, h: f64, v: f64) -> (f64, f64) {
        match self {
            Projection::Map { frame, scale } => {
                let p = frame.map_to_image_pixel(Point2D::new(h, v));
                (p.px * scale, p.py * scale)
            }
            Projection::Planar { bounds, scale } => (
                (h - bounds.min.x) * scale,
                (bounds.max.y - v) * scale,
            ),
        }
    }

    fn canvas(&self) -> (f64, f64) {
        match self {
            Projection::Map { frame, scale } => {
                let d = frame.descriptor();
                (d.width as f64 * scale, d.height as f64 * scale)
            }
            Projection::Planar { bounds, scale } => {
                (bounds.width() * scale, bounds.height() * scale)
            }
        }
    }
}

/// Builder for an overlay document.
#[derive(Debug, Clone)]
pub struct SvgOverlay {
    projection: Projection,
    doc: Document,
}

impl SvgOverlay {
    /// Overlay in the map's image space, `scale` output pixels per image
    /// pixel.
    pub fn for_map(frame: &MapFrame, scale: f64) -> Self {
        Self::with_projection(Projection::Map {
            frame: *frame,
            scale,
        })
    }

    /// Overlay for tracks without a map (e.g. lat/lng), fitted so the
    /// wider side of `bounds` spans `width_px`.
    pub fn for_bounds(bounds: Bounds, width_px: f64) -> Self {
        let span = bounds.width().max(bounds.height());
        let scale = if span > 0.0 { width_px / span } else { 1.0 };
        Self::with_projection(Projection::Planar { bounds, scale })
    }

    fn with_projection(projection: Projection) -> Self {
        let (w, h) = projection.canvas();
        let doc = Document::new()
            .set("width", w)
            .set("height", h)
            .set("viewBox", (0.0, 0.0, w, h));
        Self { projection, doc }
    }

    /// Light frame around the drawable area.
    pub fn extent(mut self) -> Self {
        let (w, h) = self.projection.canvas();
        self.doc = self.doc.add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", w)
                .set("height", h)
                .set("fill", "white")
                .set("stroke", colors::MAP_EXTENT)
                .set("stroke-width", 1.0),
        );
        self
    }

    /// Trajectory polyline. Skipped with fewer than two points.
    pub fn trajectory<P: TrackCoordinate>(mut self, trajectory: &Trajectory<P>) -> Self {
        let Some(polyline) = trajectory.polyline() else {
            return self;
        };
        let points = polyline
            .iter()
            .map(|&(h, v)| {
                let (x, y) = self.projection.project(h, v);
                format!("{:.2},{:.2}", x, y)
            })
            .collect::<Vec<_>>()
            .join(" ");
        self.doc = self.doc.add(
            Group::new().set("id", "trajectory").add(
                Polyline::new()
                    .set("points", points)
                    .set("fill", "none")
                    .set("stroke", colors::TRAJECTORY)
                    .set("stroke-width", 2.0)
                    .set("stroke-linecap", "round")
                    .set("stroke-linejoin", "round"),
            ),
        );
        self
    }

    /// Dashed outline of a fitted viewport.
    pub fn viewport(mut self, viewport: Option<Bounds>) -> Self {
        let Some(b) = viewport else {
            return self;
        };
        let (x0, y0) = self.projection.project(b.min.x, b.max.y);
        let (x1, y1) = self.projection.project(b.max.x, b.min.y);
        self.doc = self.doc.add(
            Rectangle::new()
                .set("id", "viewport")
                .set("x", x0.min(x1))
                .set("y", y0.min(y1))
                .set("width", (x1 - x0).abs())
                .set("height", (y1 - y0).abs())
                .set("fill", "none")
                .set("stroke", colors::VIEWPORT)
                .set("stroke-dasharray", "4 3"),
        );
        self
    }

    /// Dot at the current position.
    pub fn current_position<P: TrackCoordinate>(mut self, position: Option<P>) -> Self {
        let Some(p) = position else {
            return self;
        };
        let (h, v) = p.planar();
        let (x, y) = self.projection.project(h, v);
        self.doc = self.doc.add(
            Circle::new()
                .set("id", "current")
                .set("cx", x)
                .set("cy", y)
                .set("r", 5.0)
                .set("fill", colors::CURRENT)
                .set("stroke", "white")
                .set("stroke-width", 1.5),
        );
        self
    }

    /// Arrow glyph for a captured pose.
    pub fn pose(mut self, target: PoseTarget, pose: Option<MapPose>) -> Self {
        let Some(pose) = pose else {
            return self;
        };
        let (x, y) = self.projection.project(pose.x, pose.y);
        let color = match target {
            PoseTarget::Goal => colors::GOAL,
            PoseTarget::Initial => colors::INITIAL,
        };
        let s = GLYPH_SIZE;
        let arrow = format!(
            "M{:.1},0 L{:.1},{:.1} L{:.1},0 L{:.1},{:.1} Z",
            s,
            -s * 0.5,
            -s * 0.5,
            -s * 0.2,
            -s * 0.5,
            s * 0.5
        );
        self.doc = self.doc.add(
            Group::new()
                .set("id", target.to_string())
                .set(
                    "transform",
                    format!(
                        "translate({:.2},{:.2}) rotate({:.2})",
                        x,
                        y,
                        heading_to_screen_rotation(pose.yaw())
                    ),
                )
                .add(
                    SvgPath::new()
                        .set("d", arrow)
                        .set("fill", color)
                        .set("stroke", "white")
                        .set("stroke-width", 1.0),
                ),
        );
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Write the document, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        svg::save(path, &self.doc)?;
        Ok(())
    }
}

impl std::fmt::Display for SvgOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.doc)
    }
}
