//! Mission Flow Tests
//!
//! From a click on the map to a goal line on the wire:
//! capture → goal request → schedule → publish.
//!
//! Run with: `cargo test --test mission_flow`

use std::f64::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveDateTime};
use drishti::capture::{ActivationChannel, PoseCapture, PoseTarget};
use drishti::core::PixelPoint;
use drishti::frame::{MapDescriptor, MapLoadState, RenderSize};
use drishti::io::{JsonlPublisher, SvgOverlay};
use drishti::mission::{MissionPlan, MissionSchedule, launch};
use drishti::state::ContextStore;
use drishti::{DrishtiConfig, DrishtiError};
use serde_json::Value;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn map_state() -> MapLoadState {
    let descriptor = MapDescriptor::from_json(
        r#"{"originX": -10.0, "originY": -5.0, "resolution": 0.05, "width": 400, "height": 200}"#,
    );
    let mut state = MapLoadState::from_descriptor(descriptor);
    state.verify_image(400, 200);
    state
}

fn published_lines(publisher: JsonlPublisher<Vec<u8>>) -> Vec<Value> {
    String::from_utf8(publisher.into_inner())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_click_to_goal_payload() {
    let config = DrishtiConfig::default();
    let state = map_state();
    let frame = *state.frame().unwrap();
    let rendered = RenderSize::new(800.0, 400.0);
    let mut capture = PoseCapture::new(frame, config.capture.bindings.clone());

    // Center of the rendered map, dragged straight up
    capture.press(ActivationChannel::Primary, PixelPoint::new(400.0, 200.0), rendered);
    capture.drag(PixelPoint::new(400.0, 120.0), rendered);
    capture.release();

    let request = config
        .mission_launch()
        .from_snapshot(&capture.snapshot())
        .unwrap();
    let context = ContextStore::default();
    context.login("operator-token");

    let publisher = JsonlPublisher::new(Vec::new());
    let sent = launch(
        &publisher,
        &config.goal_endpoint(),
        &context.snapshot(),
        &MissionPlan::immediate(request),
        now(),
    )
    .unwrap();
    assert!(sent);

    let lines = published_lines(publisher);
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert_eq!(line["endpoint"], "http://localhost:5000/vehicle/goal");
    assert_eq!(line["authorized"], true);

    let body = &line["body"];
    assert_eq!(body["pose"]["header"]["frame_id"], "map");
    assert_eq!(body["behavior_tree"], "");
    assert!(body.get("initial_pose").is_none());
    let position = &body["pose"]["pose"]["position"];
    assert_relative_eq!(position["x"].as_f64().unwrap(), 0.0, epsilon = 1e-9);
    assert_relative_eq!(position["y"].as_f64().unwrap(), 0.0, epsilon = 1e-9);
    assert_eq!(position["z"], 0.0);
    let orientation = &body["pose"]["pose"]["orientation"];
    assert_relative_eq!(
        orientation["z"].as_f64().unwrap(),
        (FRAC_PI_2 / 2.0).sin(),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        orientation["w"].as_f64().unwrap(),
        (FRAC_PI_2 / 2.0).cos(),
        epsilon = 1e-12
    );
}

#[test]
fn test_goal_with_initial_pose() {
    let state = map_state();
    let frame = *state.frame().unwrap();
    let rendered = RenderSize::new(400.0, 200.0);
    let mut capture = PoseCapture::new(frame, Default::default());

    capture.press(ActivationChannel::Secondary, PixelPoint::new(0.0, 200.0), rendered);
    capture.release();
    capture.press(ActivationChannel::Primary, PixelPoint::new(400.0, 0.0), rendered);
    capture.release();

    let request = DrishtiConfig::default()
        .mission_launch()
        .from_snapshot(&capture.snapshot())
        .unwrap();
    let goal = request.pose.pose.position;
    assert_relative_eq!(goal.x, 10.0, epsilon = 1e-9);
    assert_relative_eq!(goal.y, 5.0, epsilon = 1e-9);
    let initial = request.initial_pose.unwrap().pose.position;
    assert_relative_eq!(initial.x, -10.0, epsilon = 1e-9);
    assert_relative_eq!(initial.y, -5.0, epsilon = 1e-9);
}

#[test]
fn test_launch_guards() {
    let config = DrishtiConfig::default();
    let empty = drishti::PoseSnapshot::default();
    assert!(matches!(
        config.mission_launch().from_snapshot(&empty),
        Err(DrishtiError::Mission(_))
    ));
    assert!(matches!(
        MissionSchedule::planned(Some("2025-06-01"), None),
        Err(DrishtiError::Mission(_))
    ));

    let state = map_state();
    let mut capture = PoseCapture::new(*state.frame().unwrap(), Default::default());
    let rendered = RenderSize::new(400.0, 200.0);
    capture.press(ActivationChannel::Primary, PixelPoint::new(100.0, 100.0), rendered);
    capture.release();
    let request = config.mission_launch().from_snapshot(&capture.snapshot()).unwrap();

    // Logged out: refused before anything is published
    let publisher = JsonlPublisher::new(Vec::new());
    let context = ContextStore::default();
    let refused = launch(
        &publisher,
        &config.goal_endpoint(),
        &context.snapshot(),
        &MissionPlan::immediate(request.clone()),
        now(),
    );
    assert!(matches!(refused, Err(DrishtiError::Mission(_))));

    // Scheduled for later: accepted but not sent yet
    context.login("t");
    let later = MissionSchedule::planned(Some("2025-06-01"), Some("18:00")).unwrap();
    let sent = launch(
        &publisher,
        &config.goal_endpoint(),
        &context.snapshot(),
        &MissionPlan::scheduled(request, later),
        now(),
    )
    .unwrap();
    assert!(!sent);
    assert!(published_lines(publisher).is_empty());
}

#[test]
fn test_map_failure_blocks_capture() {
    let mut state = MapLoadState::from_descriptor(MapDescriptor::from_json(
        r#"{"originX": 0, "originY": 0, "resolution": 0.05, "width": 100, "height": 100}"#,
    ));
    state.verify_image(120, 100);
    assert!(!state.is_ready());
    assert!(matches!(state.frame(), Err(DrishtiError::MapUnavailable(_))));

    let bad = MapLoadState::from_descriptor(MapDescriptor::from_json(
        r#"{"originX": 0, "originY": 0, "resolution": 0, "width": 100, "height": 100}"#,
    ));
    assert!(bad.frame().is_err());
}

#[test]
fn test_overlay_of_captured_poses() {
    let state = map_state();
    let frame = *state.frame().unwrap();
    let rendered = RenderSize::new(400.0, 200.0);
    let mut capture = PoseCapture::new(frame, Default::default());
    capture.press(ActivationChannel::Primary, PixelPoint::new(200.0, 100.0), rendered);
    capture.drag(PixelPoint::new(200.0, 50.0), rendered);
    capture.release();
    let snapshot = capture.snapshot();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("poses.svg");
    SvgOverlay::for_map(&frame, 2.0)
        .extent()
        .pose(PoseTarget::Goal, snapshot.goal)
        .pose(PoseTarget::Initial, snapshot.initial)
        .save(&path)
        .unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("id=\"goal\""));
    assert!(!svg.contains("id=\"initial\""));
    assert!(svg.contains("translate(400.00,200.00) rotate(-90.00)"));
}
