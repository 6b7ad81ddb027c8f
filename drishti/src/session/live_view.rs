//! Live view: wires a backend and a position stream into a trajectory and
//! current position.
//!
//! # Initialization order
//!
//! ```text
//! start() ──▶ [init thread]
//!              1. latest snapshot   (best effort, awaited)
//!              2. stream subscribe  (events apply immediately)
//!              3. history backfill  (merged into the trajectory)
//! ```
//!
//! The snapshot is awaited before subscribing so it can never land after a
//! live event. History may complete after live events; the trajectory's
//! merge policy decides what happens to those.
//!
//! # Teardown
//!
//! [`LiveView::teardown`] cancels in-flight fetches, closes the subscription
//! and joins the init thread. Once it returns nothing mutates the view.
//! Do not call it from inside a stream handler.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::core::{Bounds, TelemetrySample};
use crate::error::{DrishtiError, Result};
use crate::state::ContextStore;
use crate::telemetry::{
    HistoryMergePolicy, HistoryQuery, HistoryWindow, LivePosition, LivePositionTracker, LoadOutcome,
    PositionStream, RecordCoordinate, StreamEvent, Subscription, TelemetryBackend, Trajectory,
    ViewportPadding,
};

use super::cancel::CancelToken;

/// How a live view fetches and stores history.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveViewSettings {
    /// Robot id and limit; the window is filled in at start
    pub query: HistoryQuery,
    /// Fetch only the trailing span ending now; `None` uses `query.window`
    pub history_span_ms: Option<u64>,
    /// Newest points kept from a history load (`0` keeps all)
    pub max_points: usize,
    /// Cap on total stored points
    pub max_len: Option<usize>,
    pub merge_policy: HistoryMergePolicy,
    pub padding: ViewportPadding,
}

impl Default for LiveViewSettings {
    fn default() -> Self {
        Self {
            query: HistoryQuery::default(),
            history_span_ms: None,
            max_points: crate::telemetry::source::DEFAULT_HISTORY_LIMIT as usize,
            max_len: None,
            merge_policy: HistoryMergePolicy::default(),
            padding: ViewportPadding::default(),
        }
    }
}

/// Counters describing what a session has applied so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub snapshot_applied: bool,
    pub live_received: u64,
    pub live_appended: u64,
    pub live_malformed: u64,
    pub history: Option<LoadOutcome>,
    pub history_error: Option<String>,
}

#[derive(Debug)]
struct ViewState<P> {
    trajectory: Trajectory<P>,
    tracker: LivePositionTracker<P>,
    stats: SessionStats,
}

struct ActiveSession {
    cancel: CancelToken,
    subscription: Arc<Mutex<Option<Subscription>>>,
    init: Option<JoinHandle<()>>,
}

/// One map/telemetry view bound to a backend and a stream.
pub struct LiveView<P: RecordCoordinate> {
    backend: Arc<dyn TelemetryBackend>,
    stream: Arc<dyn PositionStream>,
    context: ContextStore,
    settings: LiveViewSettings,
    state: Arc<Mutex<ViewState<P>>>,
    active: Mutex<Option<ActiveSession>>,
}

impl<P: RecordCoordinate> LiveView<P> {
    pub fn new(
        backend: Arc<dyn TelemetryBackend>,
        stream: Arc<dyn PositionStream>,
        context: ContextStore,
        settings: LiveViewSettings,
    ) -> Self {
        let state = ViewState {
            trajectory: new_trajectory(&settings),
            tracker: LivePositionTracker::new(),
            stats: SessionStats::default(),
        };
        Self {
            backend,
            stream,
            context,
            settings,
            state: Arc::new(Mutex::new(state)),
            active: Mutex::new(None),
        }
    }

    /// Begin initialization on a background thread.
    ///
    /// Fails if a session is already active; at most one subscription per
    /// view exists at any time.
    pub fn start(&self) -> Result<()> {
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(DrishtiError::Session("live view already started".to_string()));
        }

        let cancel = CancelToken::new();
        let subscription = Arc::new(Mutex::new(None));
        let init = Initializer {
            backend: Arc::clone(&self.backend),
            stream: Arc::clone(&self.stream),
            context: self.context.clone(),
            settings: self.settings.clone(),
            state: Arc::clone(&self.state),
            cancel: cancel.clone(),
            subscription: Arc::clone(&subscription),
        };
        let handle = thread::Builder::new()
            .name("drishti-live-init".to_string())
            .spawn(move || init.run())?;

        *active = Some(ActiveSession {
            cancel,
            subscription,
            init: Some(handle),
        });
        info!("Live view started for {}", self.settings.query.robot_id);
        Ok(())
    }

    /// Block until the init thread has finished its three steps.
    ///
    /// Returns immediately when no session is active or it already
    /// finished.
    pub fn wait_for_init(&self) {
        let handle = self.active.lock().as_mut().and_then(|s| s.init.take());
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("Live view init thread panicked");
            }
        }
    }

    /// Stop the session. No state changes after this returns.
    ///
    /// Stored trajectory and position are kept; a later
    /// [`LiveView::start`] continues from them.
    pub fn teardown(&self) {
        let Some(mut session) = self.active.lock().take() else {
            return;
        };
        session.cancel.cancel();
        if let Some(sub) = session.subscription.lock().take() {
            sub.unsubscribe();
        }
        if let Some(handle) = session.init.take() {
            if handle.join().is_err() {
                warn!("Live view init thread panicked");
            }
        }
        // Init may have subscribed after the slot was emptied above.
        if let Some(sub) = session.subscription.lock().take() {
            sub.unsubscribe();
        }
        self.context.set_stream_connected(false);
        info!("Live view torn down");
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Copy of the stored trajectory.
    pub fn trajectory(&self) -> Trajectory<P> {
        self.state.lock().trajectory.clone()
    }

    /// Stored coordinates in order.
    pub fn points(&self) -> Vec<P> {
        self.state.lock().trajectory.points()
    }

    pub fn live_position(&self) -> Option<LivePosition<P>> {
        self.state.lock().tracker.current().copied()
    }

    /// The once-fitted viewport.
    pub fn viewport(&self) -> Option<Bounds> {
        self.state.lock().trajectory.viewport()
    }

    pub fn stats(&self) -> SessionStats {
        self.state.lock().stats.clone()
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }
}

impl<P: RecordCoordinate> Drop for LiveView<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<P: RecordCoordinate> std::fmt::Debug for LiveView<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveView")
            .field("settings", &self.settings)
            .field("active", &self.is_active())
            .finish()
    }
}

fn new_trajectory<P: RecordCoordinate>(settings: &LiveViewSettings) -> Trajectory<P> {
    Trajectory::new(settings.merge_policy)
        .with_padding(settings.padding)
        .with_max_len(settings.max_len)
}

/// Everything the init thread needs, moved onto it.
struct Initializer<P> {
    backend: Arc<dyn TelemetryBackend>,
    stream: Arc<dyn PositionStream>,
    context: ContextStore,
    settings: LiveViewSettings,
    state: Arc<Mutex<ViewState<P>>>,
    cancel: CancelToken,
    subscription: Arc<Mutex<Option<Subscription>>>,
}

impl<P: RecordCoordinate> Initializer<P> {
    fn run(self) {
        self.apply_snapshot();
        if self.cancel.is_cancelled() {
            return;
        }
        self.subscribe();
        if self.cancel.is_cancelled() {
            return;
        }
        self.backfill_history();
    }

    fn apply_snapshot(&self) {
        let record = match self.backend.latest(&self.cancel) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No latest position available");
                return;
            }
            Err(DrishtiError::Cancelled) => return,
            Err(e) => {
                debug!("Latest position unavailable: {}", e);
                return;
            }
        };
        let Some(sample) = record.sample::<P>() else {
            debug!("Latest position record has no usable coordinates");
            return;
        };
        let mut state = self.state.lock();
        if self.cancel.is_cancelled() {
            return;
        }
        if state.tracker.on_snapshot(sample) {
            state.stats.snapshot_applied = true;
        }
    }

    fn subscribe(&self) {
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();
        let context = self.context.clone();
        let handler = Box::new(move |event: StreamEvent| match event {
            StreamEvent::Position(record) => {
                let sample: Option<TelemetrySample<P>> = record.sample();
                let mut state = state.lock();
                if cancel.is_cancelled() {
                    return;
                }
                state.stats.live_received += 1;
                let Some(sample) = sample else {
                    state.stats.live_malformed += 1;
                    warn!("Dropping malformed position event");
                    return;
                };
                state.tracker.on_live_event(sample);
                if state.trajectory.append_live(sample) {
                    state.stats.live_appended += 1;
                }
                state.trajectory.fit_viewport_once();
            }
            StreamEvent::Connected => {
                if !cancel.is_cancelled() {
                    info!("Position stream connected");
                    context.set_stream_connected(true);
                }
            }
            StreamEvent::Disconnected(reason) => {
                if !cancel.is_cancelled() {
                    warn!(
                        "Position stream disconnected: {}",
                        reason.as_deref().unwrap_or("no reason given")
                    );
                    context.set_stream_connected(false);
                }
            }
        });

        match self.stream.subscribe(handler) {
            Ok(sub) => {
                let mut slot = self.subscription.lock();
                if self.cancel.is_cancelled() {
                    drop(slot);
                    sub.unsubscribe();
                } else {
                    *slot = Some(sub);
                }
            }
            Err(e) => warn!("Position stream subscription failed: {}", e),
        }
    }

    fn backfill_history(&self) {
        let window = match self.settings.history_span_ms {
            Some(span) => HistoryWindow::trailing(now_ms(), span),
            None => self.settings.query.window,
        };
        let query = self.settings.query.clone().with_window(window);
        debug!("Fetching history: {}", query.to_query_string());

        let result = self.backend.history(&query, &self.cancel);
        let mut state = self.state.lock();
        if self.cancel.is_cancelled() {
            return;
        }
        match result {
            Ok(records) => {
                let state = &mut *state;
                let outcome =
                    state
                        .trajectory
                        .load_history_records(&records, window, self.settings.max_points);
                state.tracker.on_history_loaded(&state.trajectory);
                state.trajectory.fit_viewport_once();
                state.stats.history = Some(outcome);
                info!(
                    "History backfill: {} point(s), trajectory now {}",
                    outcome.history_points,
                    state.trajectory.len()
                );
            }
            Err(e) => {
                warn!("History fetch failed, keeping current trajectory: {}", e);
                state.stats.history_error = Some(e.to_string());
            }
        }
    }
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
