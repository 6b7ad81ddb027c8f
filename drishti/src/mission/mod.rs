//! Mission launch: goal payloads, scheduling, and dispatch.

mod dispatch;
mod goal;
mod schedule;

pub use dispatch::{GOAL_PATH, GoalDispatch, GoalPublisher, goal_endpoint, launch};
pub use goal::{GoalRequest, Header, MAP_FRAME_ID, MissionLaunch, PoseBody, PoseStamped, Position};
pub use schedule::{MissionPlan, MissionSchedule};
