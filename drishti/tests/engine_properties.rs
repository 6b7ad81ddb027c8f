//! Engine Property Tests
//!
//! Checks the behavioral guarantees of the map frame, pose capture,
//! trajectory store and position tracker without any transport:
//! - Pixel → map conversion is independent of the rendered size
//! - Out-of-image clicks are rejected
//! - Yaw ↔ quaternion and drag-heading conventions
//! - Adjacent dedup and fit-once viewport
//! - Independent goal/initial targets
//! - Last-write-wins current position
//!
//! Run with: `cargo test --test engine_properties`

use approx::assert_relative_eq;
use drishti::capture::{ActivationChannel, ChannelBindings, PoseCapture, PoseTarget};
use drishti::core::{PixelPoint, Point2D, Quaternion, TelemetrySample};
use drishti::frame::{MapDescriptor, MapFrame, RenderSize};
use drishti::telemetry::{HistoryWindow, LivePositionTracker, PositionSource, Trajectory};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

// ============================================================================
// Fixtures
// ============================================================================

/// 800x600 map at 5cm, origin at (0,0): 40m x 30m
fn standard_frame() -> MapFrame {
    MapFrame::new(MapDescriptor::new(0.0, 0.0, 0.05, 800, 600).unwrap()).unwrap()
}

/// Map with a non-trivial origin and resolution
fn offset_frame() -> MapFrame {
    MapFrame::new(MapDescriptor::new(-12.5, 3.25, 0.025, 1024, 512).unwrap()).unwrap()
}

fn native(frame: &MapFrame) -> RenderSize {
    let d = frame.descriptor();
    RenderSize::new(d.width as f64, d.height as f64)
}

fn sample(x: f64, y: f64, ts: u64) -> TelemetrySample<Point2D> {
    TelemetrySample::new(Point2D::new(x, y), ts)
}

// ============================================================================
// Map Frame
// ============================================================================

#[test]
fn test_pixel_to_map_is_scale_invariant() {
    for frame in [standard_frame(), offset_frame()] {
        let sizes = [
            RenderSize::new(400.0, 300.0),
            RenderSize::new(1600.0, 1200.0),
            RenderSize::new(333.0, 777.0),
            native(&frame),
        ];
        for (fx, fy) in [(0.0, 0.0), (0.25, 0.75), (0.5, 0.5), (1.0, 1.0), (0.13, 0.91)] {
            let points: Vec<Point2D> = sizes
                .iter()
                .map(|size| {
                    let pixel = PixelPoint::new(fx * size.width, fy * size.height);
                    frame.pixel_to_map(pixel, *size).unwrap()
                })
                .collect();
            for p in &points[1..] {
                assert_relative_eq!(p.x, points[0].x, epsilon = 1e-9);
                assert_relative_eq!(p.y, points[0].y, epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn test_out_of_image_pixels_rejected() {
    let frame = standard_frame();
    let size = RenderSize::new(800.0, 600.0);
    assert!(frame.pixel_to_map(PixelPoint::new(-1.0, 0.0), size).is_none());
    assert!(frame.pixel_to_map(PixelPoint::new(801.0, 600.0), size).is_none());
    assert!(frame.pixel_to_map(PixelPoint::new(400.0, 601.0), size).is_none());
    // Edges are inside
    assert!(frame.pixel_to_map(PixelPoint::new(0.0, 0.0), size).is_some());
    assert!(frame.pixel_to_map(PixelPoint::new(800.0, 600.0), size).is_some());
}

#[test]
fn test_pixel_map_round_trip() {
    let frame = standard_frame();
    let size = RenderSize::new(800.0, 600.0);
    let p = frame.pixel_to_map(PixelPoint::new(400.0, 300.0), size).unwrap();
    assert_relative_eq!(p.x, 20.0, epsilon = 1e-9);
    assert_relative_eq!(p.y, 15.0, epsilon = 1e-9);

    let back = frame.map_to_image_pixel(p);
    assert_relative_eq!(back.px, 400.0, epsilon = 1e-9);
    assert_relative_eq!(back.py, 300.0, epsilon = 1e-9);

    let (fx, fy) = frame.map_to_pixel_fraction(p);
    assert_relative_eq!(fx, 0.5, epsilon = 1e-12);
    assert_relative_eq!(fy, 0.5, epsilon = 1e-12);
}

#[test]
fn test_image_top_is_map_top() {
    let frame = standard_frame();
    let size = native(&frame);
    let top_left = frame.pixel_to_map(PixelPoint::new(0.0, 0.0), size).unwrap();
    let bottom_left = frame.pixel_to_map(PixelPoint::new(0.0, 600.0), size).unwrap();
    assert_relative_eq!(top_left.y, 30.0, epsilon = 1e-9);
    assert_relative_eq!(bottom_left.y, 0.0, epsilon = 1e-9);
}

// ============================================================================
// Pose Capture
// ============================================================================

#[test]
fn test_yaw_quaternion_correspondence() {
    let q = Quaternion::from_yaw(FRAC_PI_2);
    assert_relative_eq!(q.x, 0.0);
    assert_relative_eq!(q.y, 0.0);
    assert_relative_eq!(q.z, FRAC_PI_4.sin(), epsilon = 1e-12);
    assert_relative_eq!(q.w, FRAC_PI_4.cos(), epsilon = 1e-12);
    assert_relative_eq!(q.z, 0.7071, epsilon = 1e-4);
    assert_relative_eq!(q.yaw(), FRAC_PI_2, epsilon = 1e-12);
}

#[test]
fn test_drag_heading() {
    let frame = standard_frame();
    let size = native(&frame);
    let mut capture = PoseCapture::new(frame, ChannelBindings::default());

    capture
        .press(ActivationChannel::Primary, PixelPoint::new(100.0, 100.0), size)
        .unwrap();
    let up_right = capture.drag(PixelPoint::new(150.0, 50.0), size).unwrap();
    assert_relative_eq!(up_right.goal.unwrap().yaw(), FRAC_PI_4, epsilon = 1e-12);

    let left = capture.drag(PixelPoint::new(50.0, 100.0), size).unwrap();
    assert_relative_eq!(left.goal.unwrap().yaw(), PI, epsilon = 1e-12);
    assert_eq!(capture.release(), Some(PoseTarget::Goal));
}

#[test]
fn test_drag_heading_independent_of_render_size() {
    let frame = standard_frame();
    let mut capture = PoseCapture::new(frame, ChannelBindings::default());
    let half = RenderSize::new(400.0, 300.0);

    let anchored = capture
        .press(ActivationChannel::Primary, PixelPoint::new(50.0, 50.0), half)
        .unwrap()
        .goal
        .unwrap();
    assert_relative_eq!(anchored.x, 5.0, epsilon = 1e-9);
    assert_relative_eq!(anchored.y, 25.0, epsilon = 1e-9);

    let pose = capture
        .drag(PixelPoint::new(75.0, 25.0), half)
        .unwrap()
        .goal
        .unwrap();
    assert_relative_eq!(pose.yaw(), FRAC_PI_4, epsilon = 1e-12);
    // Position stays at the press point
    assert_relative_eq!(pose.x, 5.0, epsilon = 1e-9);
}

#[test]
fn test_independent_targets() {
    let frame = standard_frame();
    let size = native(&frame);
    let mut capture = PoseCapture::new(frame, ChannelBindings::default());

    capture.press(ActivationChannel::Secondary, PixelPoint::new(200.0, 200.0), size);
    capture.drag(PixelPoint::new(200.0, 100.0), size);
    capture.release();
    let initial = capture.snapshot().initial.unwrap();

    capture.press(ActivationChannel::Primary, PixelPoint::new(600.0, 400.0), size);
    capture.drag(PixelPoint::new(500.0, 500.0), size);
    capture.drag(PixelPoint::new(700.0, 300.0), size);
    capture.release();

    let snapshot = capture.snapshot();
    assert_eq!(snapshot.initial, Some(initial));
    assert_relative_eq!(initial.yaw(), FRAC_PI_2, epsilon = 1e-12);
    assert_relative_eq!(snapshot.goal.unwrap().yaw(), FRAC_PI_4, epsilon = 1e-12);
}

#[test]
fn test_custom_channel_bindings() {
    let frame = standard_frame();
    let size = native(&frame);
    let bindings = ChannelBindings::empty()
        .bind(ActivationChannel::TouchSingle, PoseTarget::Goal)
        .bind(ActivationChannel::TouchDouble, PoseTarget::Initial);
    let mut capture = PoseCapture::new(frame, bindings);

    assert!(capture
        .press(ActivationChannel::Primary, PixelPoint::new(10.0, 10.0), size)
        .is_none());
    let snapshot = capture
        .press(ActivationChannel::TouchDouble, PixelPoint::new(10.0, 10.0), size)
        .unwrap();
    assert!(snapshot.goal.is_none());
    assert!(snapshot.initial.is_some());
}

// ============================================================================
// Trajectory Store
// ============================================================================

#[test]
fn test_adjacent_dedup() {
    let mut t = Trajectory::<Point2D>::default();
    assert!(t.append_live(sample(1.0, 2.0, 1)));
    assert!(!t.append_live(sample(1.0, 2.0, 2)));
    assert_eq!(t.len(), 1);

    let mut t = Trajectory::<Point2D>::default();
    t.append_live(sample(1.0, 2.0, 1));
    t.append_live(sample(3.0, 4.0, 2));
    t.append_live(sample(1.0, 2.0, 3));
    assert_eq!(t.len(), 3);
}

#[test]
fn test_fit_once_idempotence() {
    let mut t = Trajectory::<Point2D>::default();
    t.append_live(sample(0.0, 0.0, 1));
    assert!(t.fit_viewport_once().is_none());
    t.append_live(sample(2.0, 1.0, 2));
    let fitted = t.fit_viewport_once().unwrap();

    for i in 0..10 {
        t.append_live(sample(10.0 + i as f64, -5.0 * i as f64, 3 + i));
        assert_eq!(t.fit_viewport_once(), Some(fitted));
    }
    assert_eq!(t.viewport(), Some(fitted));
    assert_eq!(t.len(), 12);
}

#[test]
fn test_history_merge_keeps_later_live_points() {
    let mut t = Trajectory::<Point2D>::default();
    t.append_live(sample(9.0, 9.0, 150));
    t.append_live(sample(5.0, 5.0, 300));
    t.append_live(sample(6.0, 6.0, 400));

    let history = vec![sample(1.0, 1.0, 100), sample(2.0, 2.0, 200)];
    let outcome = t.load_history(history, HistoryWindow::new(None, Some(250)), 0);

    assert_eq!(outcome.history_points, 2);
    assert_eq!(outcome.live_kept, 2);
    assert_eq!(
        t.points(),
        vec![
            Point2D::new(1.0, 1.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(6.0, 6.0),
        ]
    );
}

// ============================================================================
// Live Position Tracker
// ============================================================================

#[test]
fn test_last_write_wins() {
    let mut tracker = LivePositionTracker::<Point2D>::new();
    assert!(tracker.on_snapshot(sample(0.0, 0.0, 0)));

    let mut history = Trajectory::<Point2D>::default();
    history.load_history(
        vec![sample(0.5, 0.5, 5), sample(1.0, 1.0, 10)],
        HistoryWindow::default(),
        0,
    );
    assert!(tracker.on_history_loaded(&history));
    assert_eq!(tracker.position(), Some(Point2D::new(1.0, 1.0)));

    tracker.on_live_event(sample(2.0, 2.0, 20));
    let current = tracker.current().unwrap();
    assert_eq!(current.sample.position, Point2D::new(2.0, 2.0));
    assert_eq!(current.source, PositionSource::Live);
}

#[test]
fn test_late_snapshot_is_ignored() {
    let mut tracker = LivePositionTracker::<Point2D>::new();
    tracker.on_live_event(sample(2.0, 2.0, 20));
    assert!(!tracker.on_snapshot(sample(0.0, 0.0, 0)));
    assert_eq!(tracker.position(), Some(Point2D::new(2.0, 2.0)));
}
