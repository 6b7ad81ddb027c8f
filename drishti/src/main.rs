//! Replay a recorded console session through the live view.
//!
//! Loads the recording's snapshot and history through [`ReplayBackend`],
//! feeds `live.jsonl` through a channel-backed stream, then writes an SVG
//! overlay of the resulting trajectory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin drishti-replay -- --recording recordings/run1 \
//!     --config configs/drishti.toml --output output/run1.svg
//! ```
//!
//! With `map.json` in the recording, records are read as planar `x`/`y`
//! meters and drawn over the map extent. Without it they are read as
//! `lat`/`lng`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{info, warn};

use drishti::capture::PoseTarget;
use drishti::core::{Bounds, GeoPoint, MapPose, Point2D, TrackCoordinate};
use drishti::io::replay::{live_path, load_live_records, load_map_descriptor};
use drishti::io::{JsonlPublisher, ReplayBackend, SvgOverlay, channel_stream};
use drishti::mission::{MissionPlan, launch};
use drishti::state::ContextStore;
use drishti::telemetry::{PositionRecord, RecordCoordinate, Trajectory};
use drishti::{DrishtiConfig, LiveView, MapFrame, PoseSnapshot};

/// Canvas width for overlays without a map.
const PLANAR_CANVAS_PX: f64 = 800.0;

/// How long to wait for fed live events to be applied.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "drishti-replay")]
#[command(about = "Replay a recorded console session and export an SVG overlay")]
struct Args {
    /// Recording directory (map.json, latest.json, history.json, live.jsonl)
    #[arg(short, long)]
    recording: PathBuf,

    /// Configuration file
    #[arg(short, long, default_value = "drishti.toml")]
    config: PathBuf,

    /// Output SVG (overrides output.svg_path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dry-run a goal at "x,y,yaw" (meters, radians); printed as JSON lines
    #[arg(long, value_parser = parse_pose)]
    goal: Option<MapPose>,

    /// Bearer token used for the dry-run goal
    #[arg(long)]
    token: Option<String>,
}

fn parse_pose(s: &str) -> Result<MapPose, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    match parts.as_slice() {
        [x, y] => Ok(MapPose::new(*x, *y, 0.0)),
        [x, y, yaw] => Ok(MapPose::new(*x, *y, *yaw)),
        _ => Err(format!("expected x,y[,yaw], got '{}'", s)),
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let (config, found) = read_config(&args.config)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level))
        .init();
    if !found {
        warn!("Config {} not found, using defaults", args.config.display());
    }

    info!("Recording: {}", args.recording.display());
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.svg_path));

    let live_file = live_path(&args.recording);
    let live = if live_file.exists() {
        load_live_records(&live_file)?
    } else {
        Vec::new()
    };

    let context = ContextStore::default();
    if let Some(token) = &args.token {
        context.login(token.clone());
    }

    let overlay = match load_map_descriptor(&args.recording)? {
        Some(descriptor) => {
            let frame = MapFrame::new(descriptor)?;
            let view = replay::<Point2D>(&args.recording, &config, &context, &live)?;
            let current = view.live_position().map(|p| p.sample.position);
            draw_session(
                SvgOverlay::for_map(&frame, config.output.svg_scale),
                &view.trajectory(),
                current,
                args.goal,
            )
        }
        None => {
            let view = replay::<GeoPoint>(&args.recording, &config, &context, &live)?;
            let trajectory = view.trajectory();
            // The viewport is fitted once; later points may fall outside it
            let mut bounds = Bounds::from_coordinates(trajectory.points().iter())
                .union(&view.viewport().unwrap_or_else(Bounds::empty));
            if bounds.is_empty() {
                warn!("No plottable positions in recording");
                bounds = Bounds::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0));
            }
            let current = view.live_position().map(|p| p.sample.position);
            draw_session(
                SvgOverlay::for_bounds(bounds, PLANAR_CANVAS_PX),
                &trajectory,
                current,
                args.goal,
            )
        }
    };

    overlay.save(&output)?;
    println!("Overlay written to {}", output.display());

    if let Some(goal) = args.goal {
        dry_run_goal(&config, &context, goal)?;
    }
    Ok(())
}

/// Config at `path`, or defaults when the file is missing. Runs before the
/// logger is set up, so the caller reports the fallback.
fn read_config(path: &Path) -> drishti::Result<(DrishtiConfig, bool)> {
    if path.exists() {
        Ok((DrishtiConfig::load(path)?, true))
    } else {
        Ok((DrishtiConfig::default(), false))
    }
}

/// Layers drawn for a replayed session, whatever the projection.
fn draw_session<P: TrackCoordinate>(
    overlay: SvgOverlay,
    trajectory: &Trajectory<P>,
    current: Option<P>,
    goal: Option<MapPose>,
) -> SvgOverlay {
    overlay
        .extent()
        .trajectory(trajectory)
        .viewport(trajectory.viewport())
        .current_position(current)
        .pose(PoseTarget::Goal, goal)
}

/// Run a live view over the recording until every live record was applied.
fn replay<P: RecordCoordinate>(
    recording: &Path,
    config: &DrishtiConfig,
    context: &ContextStore,
    live: &[PositionRecord],
) -> Result<LiveView<P>, Box<dyn std::error::Error>> {
    let backend = ReplayBackend::from_dir(recording)?;
    info!("Replay backend: {} history records", backend.history_len());
    let (feed, stream) = channel_stream(config.backend.stream_capacity);

    let view = LiveView::<P>::new(
        Arc::new(backend),
        Arc::new(stream),
        context.clone(),
        config.live_view_settings(),
    );
    view.start()?;
    view.wait_for_init();

    feed.connected()?;
    for record in live {
        feed.position(record.clone())?;
    }

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    while view.stats().live_received < live.len() as u64 {
        if Instant::now() >= deadline {
            warn!("Timed out waiting for live events to drain");
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    view.teardown();

    let stats = view.stats();
    println!("Snapshot applied: {}", stats.snapshot_applied);
    if let Some(history) = &stats.history {
        println!(
            "History: {} points ({} malformed, {} truncated, {} live kept)",
            history.history_points, history.malformed, history.truncated, history.live_kept
        );
    }
    if let Some(e) = &stats.history_error {
        println!("History failed: {}", e);
    }
    println!(
        "Live: {} received, {} appended, {} malformed",
        stats.live_received, stats.live_appended, stats.live_malformed
    );
    println!("Trajectory: {} points", view.trajectory().len());
    Ok(view)
}

fn dry_run_goal(
    config: &DrishtiConfig,
    context: &ContextStore,
    goal: MapPose,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = PoseSnapshot {
        goal: Some(goal),
        initial: None,
    };
    let request = config.mission_launch().from_snapshot(&snapshot)?;
    let publisher = JsonlPublisher::new(std::io::stdout());
    let sent = launch(
        &publisher,
        &config.goal_endpoint(),
        &context.snapshot(),
        &MissionPlan::immediate(request),
        chrono::Local::now().naive_local(),
    )?;
    info!("Dry-run goal sent: {}", sent);
    Ok(())
}
