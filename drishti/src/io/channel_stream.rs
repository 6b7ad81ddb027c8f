//! In-process position stream backed by crossbeam channels.
//!
//! A [`StreamFeed`] is the producer side (a transport adapter, a replay
//! file, a test). [`ChannelPositionStream`] implements [`PositionStream`]
//! by running a dispatcher thread per subscription.
//!
//! ```text
//! StreamFeed ──events──▶ [bounded channel] ──▶ dispatcher ──▶ handler
//!                                               ▲
//!             Subscription::unsubscribe ── stop ┘ (joined)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded, select};
use log::{debug, info, trace};

use crate::error::{DrishtiError, Result};
use crate::telemetry::{EventHandler, PositionRecord, PositionStream, StreamEvent, Subscription};

/// Default number of events buffered between feed and dispatcher.
pub const DEFAULT_STREAM_CAPACITY: usize = 256;

/// Create a connected feed/stream pair.
pub fn channel_stream(capacity: usize) -> (StreamFeed, ChannelPositionStream) {
    let (tx, rx) = bounded(capacity.max(1));
    (
        StreamFeed { tx },
        ChannelPositionStream {
            rx,
            subscribed: Arc::new(AtomicBool::new(false)),
        },
    )
}

/// Producer side of a [`ChannelPositionStream`].
#[derive(Debug, Clone)]
pub struct StreamFeed {
    tx: Sender<StreamEvent>,
}

impl StreamFeed {
    /// Push an event, blocking while the buffer is full.
    pub fn send(&self, event: StreamEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| DrishtiError::Transport("position stream closed".to_string()))
    }

    pub fn position(&self, record: PositionRecord) -> Result<()> {
        self.send(StreamEvent::Position(record))
    }

    pub fn connected(&self) -> Result<()> {
        self.send(StreamEvent::Connected)
    }

    pub fn disconnected(&self, reason: impl Into<String>) -> Result<()> {
        self.send(StreamEvent::Disconnected(Some(reason.into())))
    }

    /// Events waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

/// [`PositionStream`] fed by a [`StreamFeed`]. One subscriber at a time.
#[derive(Debug, Clone)]
pub struct ChannelPositionStream {
    rx: Receiver<StreamEvent>,
    subscribed: Arc<AtomicBool>,
}

impl ChannelPositionStream {
    pub fn has_subscriber(&self) -> bool {
        self.subscribed.load(Ordering::Acquire)
    }
}

impl PositionStream for ChannelPositionStream {
    fn subscribe(&self, on_event: EventHandler) -> Result<Subscription> {
        if self
            .subscribed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DrishtiError::Session(
                "position stream already has a subscriber".to_string(),
            ));
        }

        let (stop_tx, stop_rx) = bounded::<()>(0);
        let events = self.rx.clone();
        let spawned = thread::Builder::new()
            .name("drishti-stream".to_string())
            .spawn(move || dispatch(events, stop_rx, on_event));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.subscribed.store(false, Ordering::Release);
                return Err(e.into());
            }
        };
        info!("Position stream subscribed");

        let subscribed = Arc::clone(&self.subscribed);
        Ok(Subscription::new(move || {
            drop(stop_tx);
            if thread::current().id() != handle.thread().id() {
                let _ = handle.join();
            }
            subscribed.store(false, Ordering::Release);
            info!("Position stream unsubscribed");
        }))
    }
}

fn dispatch(events: Receiver<StreamEvent>, stop: Receiver<()>, on_event: EventHandler) {
    loop {
        select! {
            recv(stop) -> _ => break,
            recv(events) -> msg => match msg {
                Ok(event) => {
                    if stop_requested(&stop) {
                        break;
                    }
                    trace!("Dispatching {} event", event.name());
                    on_event(event);
                }
                Err(_) => {
                    debug!("Position feed closed");
                    break;
                }
            },
        }
    }
}

/// The stop channel disconnects when the subscription is closed.
fn stop_requested(stop: &Receiver<()>) -> bool {
    matches!(
        stop.try_recv(),
        Err(crossbeam_channel::TryRecvError::Disconnected)
    )
}
