//! Goal payload for the vehicle goal endpoint.
//!
//! ```json
//! {
//!   "pose": {
//!     "header": {"frame_id": "map"},
//!     "pose": {
//!       "position": {"x": 20.0, "y": 15.0, "z": 0.0},
//!       "orientation": {"x": 0.0, "y": 0.0, "z": 0.707, "w": 0.707}
//!     }
//!   },
//!   "initial_pose": { ... },
//!   "behavior_tree": ""
//! }
//! ```
//!
//! `initial_pose` is omitted when the operator did not set one.

use serde::{Deserialize, Serialize};

use crate::capture::PoseSnapshot;
use crate::core::{MapPose, Quaternion};
use crate::error::{DrishtiError, Result};

/// Frame every captured pose is expressed in.
pub const MAP_FRAME_ID: &str = "map";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub frame_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseBody {
    pub position: Position,
    pub orientation: Quaternion,
}

/// A pose tagged with its reference frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: PoseBody,
}

impl PoseStamped {
    /// Planar pose lifted to 3D with `z = 0`.
    pub fn from_map_pose(pose: &MapPose, frame_id: &str) -> Self {
        Self {
            header: Header {
                frame_id: frame_id.to_string(),
            },
            pose: PoseBody {
                position: Position {
                    x: pose.x,
                    y: pose.y,
                    z: 0.0,
                },
                orientation: pose.orientation(),
            },
        }
    }
}

/// Body of `POST /vehicle/goal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRequest {
    pub pose: PoseStamped,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_pose: Option<PoseStamped>,
    /// Behavior tree name; empty selects the robot's default
    #[serde(default)]
    pub behavior_tree: String,
}

/// Builds goal requests from captured poses.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionLaunch {
    frame_id: String,
    behavior_tree: String,
}

impl Default for MissionLaunch {
    fn default() -> Self {
        Self {
            frame_id: MAP_FRAME_ID.to_string(),
            behavior_tree: String::new(),
        }
    }
}

impl MissionLaunch {
    pub fn new(frame_id: impl Into<String>, behavior_tree: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            behavior_tree: behavior_tree.into(),
        }
    }

    /// Request for the current capture state.
    ///
    /// Fails when no goal has been set; the initial pose is optional.
    pub fn from_snapshot(&self, snapshot: &PoseSnapshot) -> Result<GoalRequest> {
        let goal = snapshot
            .goal
            .ok_or_else(|| DrishtiError::Mission("destination required".to_string()))?;
        Ok(GoalRequest {
            pose: PoseStamped::from_map_pose(&goal, &self.frame_id),
            initial_pose: snapshot
                .initial
                .map(|p| PoseStamped::from_map_pose(&p, &self.frame_id)),
            behavior_tree: self.behavior_tree.clone(),
        })
    }
}
