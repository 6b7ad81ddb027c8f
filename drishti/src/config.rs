//! Configuration loading for Drishti

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::capture::ChannelBindings;
use crate::error::{DrishtiError, Result};
use crate::mission::{GOAL_PATH, MAP_FRAME_ID, MissionLaunch, goal_endpoint};
use crate::session::LiveViewSettings;
use crate::telemetry::{HistoryMergePolicy, HistoryQuery, ViewportPadding};

/// Main configuration structure
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrishtiConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub mission: MissionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Backend endpoints
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the console backend (default: http://localhost:5000)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Goal endpoint path (default: /vehicle/goal)
    #[serde(default = "default_goal_path")]
    pub goal_path: String,

    /// Events buffered between stream transport and dispatcher (default: 256)
    #[serde(default = "default_stream_capacity")]
    pub stream_capacity: usize,
}

/// History backfill
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Robot whose history is fetched (default: robot_1)
    #[serde(default = "default_robot_id")]
    pub robot_id: String,

    /// Records requested from the backend (default: 200)
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Fetch only this trailing span, in milliseconds (default: unbounded)
    #[serde(default)]
    pub span_ms: Option<u64>,

    /// Newest points kept from a load, 0 keeps all (default: 200)
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// Cap on total stored trajectory points (default: none)
    #[serde(default)]
    pub max_track_len: Option<usize>,

    /// What a history load does to live points already stored (default: merge)
    #[serde(default)]
    pub merge_policy: HistoryMergePolicy,
}

/// Pose capture
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Activation channel → target table (default: primary→goal, secondary→initial)
    #[serde(default)]
    pub bindings: ChannelBindings,
}

/// Trajectory viewport fitting
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Fraction of the track extent added on each side (default: 0.1)
    #[serde(default = "default_padding_ratio")]
    pub padding_ratio: f64,

    /// Margin for a zero-extent axis, in coordinate units (default: 1e-4)
    #[serde(default = "default_min_margin")]
    pub min_margin: f64,
}

/// Mission launch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    /// Frame id stamped on goal poses (default: map)
    #[serde(default = "default_frame_id")]
    pub frame_id: String,

    /// Behavior tree sent with goals (default: empty)
    #[serde(default)]
    pub behavior_tree: String,
}

/// Logging
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset (default: info)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Output configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path to save the SVG overlay
    #[serde(default = "default_svg_path")]
    pub svg_path: String,

    /// Output pixels per map image pixel (default: 1.0)
    #[serde(default = "default_svg_scale")]
    pub svg_scale: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            goal_path: default_goal_path(),
            stream_capacity: default_stream_capacity(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            robot_id: default_robot_id(),
            limit: default_limit(),
            span_ms: None,
            max_points: default_max_points(),
            max_track_len: None,
            merge_policy: HistoryMergePolicy::default(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            padding_ratio: default_padding_ratio(),
            min_margin: default_min_margin(),
        }
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            frame_id: default_frame_id(),
            behavior_tree: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            svg_path: default_svg_path(),
            svg_scale: default_svg_scale(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_goal_path() -> String {
    GOAL_PATH.to_string()
}
fn default_stream_capacity() -> usize {
    crate::io::channel_stream::DEFAULT_STREAM_CAPACITY
}
fn default_robot_id() -> String {
    crate::telemetry::source::DEFAULT_ROBOT_ID.to_string()
}
fn default_limit() -> u32 {
    crate::telemetry::source::DEFAULT_HISTORY_LIMIT
}
fn default_max_points() -> usize {
    200
}
fn default_padding_ratio() -> f64 {
    0.1
}
fn default_min_margin() -> f64 {
    1e-4
}
fn default_frame_id() -> String {
    MAP_FRAME_ID.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_svg_path() -> String {
    "output/overlay.svg".to_string()
}
fn default_svg_scale() -> f64 {
    1.0
}

impl DrishtiConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DrishtiError::Config(format!("Failed to read config file: {}", e)))?;
        let config: DrishtiConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given and present, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            Some(p) => {
                info!("Config {} not found, using defaults", p.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(DrishtiError::Config("backend.base_url is empty".to_string()));
        }
        if !(self.viewport.padding_ratio.is_finite() && self.viewport.padding_ratio >= 0.0) {
            return Err(DrishtiError::Config(
                "viewport.padding_ratio must be >= 0".to_string(),
            ));
        }
        if !(self.viewport.min_margin.is_finite() && self.viewport.min_margin >= 0.0) {
            return Err(DrishtiError::Config(
                "viewport.min_margin must be >= 0".to_string(),
            ));
        }
        if !(self.output.svg_scale.is_finite() && self.output.svg_scale > 0.0) {
            return Err(DrishtiError::Config("output.svg_scale must be > 0".to_string()));
        }
        if self.capture.bindings.is_empty() {
            return Err(DrishtiError::Config(
                "capture.bindings binds no channel".to_string(),
            ));
        }
        Ok(())
    }

    /// Full goal endpoint URL.
    pub fn goal_endpoint(&self) -> String {
        goal_endpoint(&self.backend.base_url, &self.backend.goal_path)
    }

    pub fn history_query(&self) -> HistoryQuery {
        HistoryQuery::new(self.history.robot_id.clone()).with_limit(self.history.limit)
    }

    pub fn live_view_settings(&self) -> LiveViewSettings {
        LiveViewSettings {
            query: self.history_query(),
            history_span_ms: self.history.span_ms,
            max_points: self.history.max_points,
            max_len: self.history.max_track_len,
            merge_policy: self.history.merge_policy,
            padding: ViewportPadding {
                ratio: self.viewport.padding_ratio,
                min_margin: self.viewport.min_margin,
            },
        }
    }

    pub fn mission_launch(&self) -> MissionLaunch {
        MissionLaunch::new(self.mission.frame_id.clone(), self.mission.behavior_tree.clone())
    }
}
