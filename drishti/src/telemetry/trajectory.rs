//! Trajectory store: history backfill merged with live appends.
//!
//! # Invariants
//!
//! - Points are kept in arrival order, which is treated as temporal order.
//! - No two consecutive points have identical coordinates. Deduplication is
//!   adjacent-only; a robot returning to an earlier spot adds a point.
//! - The viewport is fitted once, the first time the store holds two or
//!   more points, and is not recomputed as points keep arriving.
//!
//! # History vs. live
//!
//! History loads and the live stream run concurrently, so live points may
//! already be stored when a history window lands. With
//! [`HistoryMergePolicy::Merge`] those live points are spliced after the
//! window instead of being discarded:
//!
//! ```text
//!   stored:   L1 L2 L3                 (live, t = 90, 105, 110)
//!   window:   H1 H2 … Hn  until = 100
//!   result:   H1 H2 … Hn L2 L3         (L1 is covered by the window)
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::{Bounds, TelemetrySample, TrackCoordinate};

use super::record::{PositionRecord, RecordCoordinate, collect_samples};
use super::source::HistoryWindow;

/// How a history load treats points already in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMergePolicy {
    /// Discard everything and keep only the loaded window.
    Replace,
    /// Keep live points newer than the window, appended after it.
    #[default]
    Merge,
}

/// Where a stored point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointOrigin {
    History,
    Live,
}

/// A stored trajectory point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint<P> {
    pub sample: TelemetrySample<P>,
    pub origin: PointOrigin,
}

/// Padding applied around the fitted viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportPadding {
    /// Fraction of the track extent added on each side
    pub ratio: f64,
    /// Margin for an axis with zero extent, in coordinate units
    pub min_margin: f64,
}

impl Default for ViewportPadding {
    fn default() -> Self {
        Self {
            ratio: 0.1,
            min_margin: 1e-4,
        }
    }
}

/// What a history load did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOutcome {
    /// History points stored after filtering and dedup
    pub history_points: usize,
    /// Records dropped for missing or non-finite coordinates
    pub malformed: usize,
    /// Oldest records dropped to respect `max_points`
    pub truncated: usize,
    /// Previously stored live points kept after the window
    pub live_kept: usize,
}

/// Ordered, adjacent-deduplicated position track.
#[derive(Debug, Clone)]
pub struct Trajectory<P> {
    points: Vec<TrackPoint<P>>,
    policy: HistoryMergePolicy,
    padding: ViewportPadding,
    max_len: Option<usize>,
    viewport: Option<Bounds>,
}

impl<P: TrackCoordinate> Default for Trajectory<P> {
    fn default() -> Self {
        Self::new(HistoryMergePolicy::default())
    }
}

impl<P: TrackCoordinate> Trajectory<P> {
    pub fn new(policy: HistoryMergePolicy) -> Self {
        Self {
            points: Vec::new(),
            policy,
            padding: ViewportPadding::default(),
            max_len: None,
            viewport: None,
        }
    }

    pub fn with_padding(mut self, padding: ViewportPadding) -> Self {
        self.padding = padding;
        self
    }

    /// Cap the total number of stored points; the oldest are evicted.
    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len.filter(|&n| n > 0);
        self
    }

    #[inline]
    pub fn policy(&self) -> HistoryMergePolicy {
        self.policy
    }

    /// Install a history window.
    ///
    /// Samples must be oldest first. Samples with non-finite coordinates are
    /// dropped, then only the newest `max_points` are kept (`0` means no
    /// limit). What happens to already-stored points depends on the
    /// [`HistoryMergePolicy`].
    pub fn load_history<I>(&mut self, samples: I, window: HistoryWindow, max_points: usize) -> LoadOutcome
    where
        I: IntoIterator<Item = TelemetrySample<P>>,
    {
        let mut outcome = LoadOutcome::default();

        let mut valid: Vec<TelemetrySample<P>> = Vec::new();
        for s in samples {
            if is_finite(&s.position) {
                valid.push(s);
            } else {
                outcome.malformed += 1;
            }
        }
        if max_points > 0 && valid.len() > max_points {
            outcome.truncated = valid.len() - max_points;
            valid.drain(..outcome.truncated);
        }

        let cutoff = window
            .until_ms
            .or_else(|| valid.iter().rev().find_map(|s| s.timestamp_ms));

        let previous = std::mem::take(&mut self.points);
        for sample in valid {
            self.push_dedup(TrackPoint {
                sample,
                origin: PointOrigin::History,
            });
        }
        outcome.history_points = self.points.len();

        if self.policy == HistoryMergePolicy::Merge {
            for point in previous {
                if point.origin == PointOrigin::Live && is_after(point.sample.timestamp_ms, cutoff) {
                    if self.push_dedup(point) {
                        outcome.live_kept += 1;
                    }
                }
            }
        }
        self.enforce_max_len();

        if outcome.malformed > 0 {
            warn!("History load dropped {} malformed sample(s)", outcome.malformed);
        }
        debug!(
            "History loaded: {} point(s), {} truncated, {} live kept ({:?})",
            outcome.history_points, outcome.truncated, outcome.live_kept, self.policy
        );
        outcome
    }

    /// [`Trajectory::load_history`] from undecoded records.
    pub fn load_history_records(
        &mut self,
        records: &[PositionRecord],
        window: HistoryWindow,
        max_points: usize,
    ) -> LoadOutcome
    where
        P: RecordCoordinate,
    {
        let decoded = collect_samples::<P>(records);
        let mut outcome = self.load_history(decoded.samples, window, max_points);
        outcome.malformed += decoded.dropped;
        if decoded.dropped > 0 {
            warn!("History load dropped {} malformed record(s)", decoded.dropped);
        }
        outcome
    }

    /// Append a live sample.
    ///
    /// Returns `false` when the sample was dropped, either because its
    /// coordinates equal the last stored point's or because they are not
    /// finite.
    pub fn append_live(&mut self, sample: TelemetrySample<P>) -> bool {
        if !is_finite(&sample.position) {
            warn!("Dropping live sample with non-finite coordinates");
            return false;
        }
        let appended = self.push_dedup(TrackPoint {
            sample,
            origin: PointOrigin::Live,
        });
        if appended {
            self.enforce_max_len();
        }
        appended
    }

    /// Fit the viewport the first time there are at least two points.
    ///
    /// Returns the recorded viewport, which never changes once set.
    pub fn fit_viewport_once(&mut self) -> Option<Bounds> {
        if self.viewport.is_none() && self.points.len() >= 2 {
            let bounds = Bounds::from_coordinates(self.points.iter().map(|p| &p.sample.position))
                .pad(self.padding.ratio, self.padding.min_margin);
            debug!(
                "Viewport fitted: ({:.6}, {:.6}) .. ({:.6}, {:.6})",
                bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
            );
            self.viewport = Some(bounds);
        }
        self.viewport
    }

    /// The recorded viewport, if one has been fitted.
    #[inline]
    pub fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    /// Forget the fitted viewport so the next fit recomputes it.
    pub fn reset_viewport(&mut self) {
        self.viewport = None;
    }

    /// Stored coordinates in order.
    pub fn points(&self) -> Vec<P> {
        self.points.iter().map(|p| p.sample.position).collect()
    }

    /// Stored points with timestamps and origin.
    pub fn track(&self) -> &[TrackPoint<P>] {
        &self.points
    }

    /// Planar `(horizontal, vertical)` pairs for drawing, `None` with fewer
    /// than two points.
    pub fn polyline(&self) -> Option<Vec<(f64, f64)>> {
        (self.points.len() >= 2)
            .then(|| self.points.iter().map(|p| p.sample.position.planar()).collect())
    }

    pub fn last(&self) -> Option<&TelemetrySample<P>> {
        self.points.last().map(|p| &p.sample)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn push_dedup(&mut self, point: TrackPoint<P>) -> bool {
        if self
            .points
            .last()
            .is_some_and(|last| last.sample.position == point.sample.position)
        {
            return false;
        }
        self.points.push(point);
        true
    }

    fn enforce_max_len(&mut self) {
        if let Some(max) = self.max_len {
            if self.points.len() > max {
                let excess = self.points.len() - max;
                self.points.drain(..excess);
            }
        }
    }
}

fn is_finite<P: TrackCoordinate>(p: &P) -> bool {
    let (h, v) = p.planar();
    h.is_finite() && v.is_finite()
}

/// Unknown timestamps and a missing cutoff both count as "after".
fn is_after(ts: Option<u64>, cutoff: Option<u64>) -> bool {
    match (ts, cutoff) {
        (Some(ts), Some(cutoff)) => ts > cutoff,
        _ => true,
    }
}
