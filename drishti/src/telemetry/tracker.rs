//! Current-position tracker.
//!
//! Last write wins, by arrival order. The one exception is the startup
//! snapshot: it is best effort and never overwrites a value that came from
//! history or the live stream.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::core::{TelemetrySample, TrackCoordinate};

use super::trajectory::{PointOrigin, Trajectory};

/// Which input produced the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    Snapshot,
    History,
    Live,
}

/// The current position and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LivePosition<P> {
    pub sample: TelemetrySample<P>,
    pub source: PositionSource,
}

/// Tracks the authoritative latest sample.
#[derive(Debug, Clone)]
pub struct LivePositionTracker<P> {
    current: Option<LivePosition<P>>,
}

impl<P: TrackCoordinate> Default for LivePositionTracker<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: TrackCoordinate> LivePositionTracker<P> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Apply the startup snapshot.
    ///
    /// Ignored once history or a live event has been applied. Returns
    /// whether the snapshot was taken.
    pub fn on_snapshot(&mut self, sample: TelemetrySample<P>) -> bool {
        if let Some(current) = &self.current {
            if current.source != PositionSource::Snapshot {
                debug!("Stale snapshot ignored, current from {:?}", current.source);
                return false;
            }
        }
        self.set(sample, PositionSource::Snapshot);
        true
    }

    /// Take the last point of a freshly loaded trajectory, if any. A live
    /// point kept by a merge stays labelled live.
    pub fn on_history_loaded(&mut self, trajectory: &Trajectory<P>) -> bool {
        match trajectory.track().last() {
            Some(last) => {
                let source = match last.origin {
                    PointOrigin::History => PositionSource::History,
                    PointOrigin::Live => PositionSource::Live,
                };
                self.set(last.sample, source);
                true
            }
            None => false,
        }
    }

    /// Apply a live event. Always overwrites.
    pub fn on_live_event(&mut self, sample: TelemetrySample<P>) {
        self.set(sample, PositionSource::Live);
    }

    #[inline]
    pub fn current(&self) -> Option<&LivePosition<P>> {
        self.current.as_ref()
    }

    /// Current coordinates only.
    pub fn position(&self) -> Option<P> {
        self.current.map(|c| c.sample.position)
    }

    fn set(&mut self, sample: TelemetrySample<P>, source: PositionSource) {
        trace!("Live position from {:?}: {:?}", source, sample.position);
        self.current = Some(LivePosition { sample, source });
    }
}
