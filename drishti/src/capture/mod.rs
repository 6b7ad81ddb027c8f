//! Pose capture from pointer drags.
//!
//! - [`ChannelBindings`]: which activation channel sets which target
//! - [`PoseCapture`]: the press/drag/release state machine

mod binding;
mod pose_capture;

pub use binding::{ActivationChannel, ChannelBindings, PoseTarget};
pub use pose_capture::{PoseCapture, PoseListener, PoseSnapshot};
