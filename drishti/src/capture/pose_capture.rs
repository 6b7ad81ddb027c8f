//! Drag-gesture pose capture.
//!
//! # State machine
//!
//! ```text
//!           press (bound channel, in bounds)
//!   Idle ──────────────────────────────────────▶ Dragging(target)
//!    ▲                                              │ drag: yaw from anchor
//!    └──────────────────── release ─────────────────┘
//! ```
//!
//! - Press sets the target's position with `yaw = 0` and emits.
//! - Drag updates only the yaw, measured from the fixed press point, and emits.
//! - Release stops without emitting.
//!
//! Every emission carries both poses so consumers always see a consistent
//! pair. The two targets never affect each other.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::core::math::pixel_heading;
use crate::core::{MapPose, PixelPoint};
use crate::frame::{MapFrame, RenderSize};

use super::binding::{ActivationChannel, ChannelBindings, PoseTarget};

/// Joint view of both captured poses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseSnapshot {
    pub goal: Option<MapPose>,
    pub initial: Option<MapPose>,
}

impl PoseSnapshot {
    #[inline]
    pub fn get(&self, target: PoseTarget) -> Option<MapPose> {
        match target {
            PoseTarget::Goal => self.goal,
            PoseTarget::Initial => self.initial,
        }
    }
}

/// Callback invoked with every emitted snapshot.
pub type PoseListener = Box<dyn FnMut(&PoseSnapshot) + Send>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum CaptureState {
    Idle,
    Dragging {
        target: PoseTarget,
        /// Press point in image pixels
        anchor: PixelPoint,
    },
}

/// Turns press/drag/release events into goal and initial poses.
pub struct PoseCapture {
    frame: MapFrame,
    bindings: ChannelBindings,
    state: CaptureState,
    poses: PoseSnapshot,
    listener: Option<PoseListener>,
}

impl PoseCapture {
    pub fn new(frame: MapFrame, bindings: ChannelBindings) -> Self {
        Self {
            frame,
            bindings,
            state: CaptureState::Idle,
            poses: PoseSnapshot::default(),
            listener: None,
        }
    }

    /// Register the callback receiving every emission.
    pub fn set_listener(&mut self, listener: impl FnMut(&PoseSnapshot) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Builder form of [`PoseCapture::set_listener`].
    pub fn with_listener(mut self, listener: impl FnMut(&PoseSnapshot) + Send + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    /// Swap in a new map. Any active drag is abandoned; stored poses stay.
    pub fn set_frame(&mut self, frame: MapFrame) {
        self.frame = frame;
        self.state = CaptureState::Idle;
    }

    /// Start a drag.
    ///
    /// Ignored (returns `None`) when the channel is unbound, the press is
    /// outside the rendered map, or another drag is already active.
    pub fn press(
        &mut self,
        channel: ActivationChannel,
        pixel: PixelPoint,
        rendered: RenderSize,
    ) -> Option<PoseSnapshot> {
        if let CaptureState::Dragging { target, .. } = self.state {
            debug!(
                "Press on {:?} rejected: {} drag already active",
                channel, target
            );
            return None;
        }
        let target = self.bindings.resolve(channel)?;
        let anchor = self.frame.rendered_to_image(pixel, rendered)?;
        let position = self.frame.image_to_map(anchor);

        self.state = CaptureState::Dragging { target, anchor };
        self.store(target, MapPose::new(position.x, position.y, 0.0));
        debug!(
            "{} pose anchored at ({:.3}, {:.3})",
            target, position.x, position.y
        );
        Some(self.emit())
    }

    /// Update the active drag's heading.
    ///
    /// The heading points from the press location to `pixel`. The pointer may
    /// leave the map while dragging; only the press itself must be in bounds.
    pub fn drag(&mut self, pixel: PixelPoint, rendered: RenderSize) -> Option<PoseSnapshot> {
        let CaptureState::Dragging { target, anchor } = self.state else {
            return None;
        };
        let current = self.frame.scale_to_image(pixel, rendered)?;
        let yaw = pixel_heading(current.px - anchor.px, current.py - anchor.py);
        let pose = self.poses.get(target)?.with_yaw(yaw);
        self.store(target, pose);
        trace!("{} yaw {:.4}", target, yaw);
        Some(self.emit())
    }

    /// End the active drag. Returns the target that was being dragged.
    pub fn release(&mut self) -> Option<PoseTarget> {
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Dragging { target, .. } => Some(target),
            CaptureState::Idle => None,
        }
    }

    /// Forget one stored pose and emit the result.
    ///
    /// A drag on that target is ended as well.
    pub fn clear(&mut self, target: PoseTarget) -> PoseSnapshot {
        if matches!(self.state, CaptureState::Dragging { target: t, .. } if t == target) {
            self.state = CaptureState::Idle;
        }
        match target {
            PoseTarget::Goal => self.poses.goal = None,
            PoseTarget::Initial => self.poses.initial = None,
        }
        self.emit()
    }

    /// Copy of both current poses.
    #[inline]
    pub fn snapshot(&self) -> PoseSnapshot {
        self.poses
    }

    /// Target of the active drag, if any.
    pub fn dragging(&self) -> Option<PoseTarget> {
        match self.state {
            CaptureState::Dragging { target, .. } => Some(target),
            CaptureState::Idle => None,
        }
    }

    fn store(&mut self, target: PoseTarget, pose: MapPose) {
        match target {
            PoseTarget::Goal => self.poses.goal = Some(pose),
            PoseTarget::Initial => self.poses.initial = Some(pose),
        }
    }

    fn emit(&mut self) -> PoseSnapshot {
        let snapshot = self.poses;
        if let Some(listener) = self.listener.as_mut() {
            listener(&snapshot);
        }
        snapshot
    }
}

impl std::fmt::Debug for PoseCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseCapture")
            .field("frame", &self.frame)
            .field("bindings", &self.bindings)
            .field("state", &self.state)
            .field("poses", &self.poses)
            .field("listener", &self.listener.as_ref().map(|_| "..."))
            .finish()
    }
}
