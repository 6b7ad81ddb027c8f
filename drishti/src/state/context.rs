//! Console context: session token and link flags.
//!
//! Readers hold immutable [`Arc`] snapshots. All changes go through
//! [`ContextStore::update`], which builds a new snapshot and bumps its
//! revision; a reader's snapshot never changes under it.

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::Serialize;

/// Immutable view of console-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsoleContext {
    /// Bearer token of the logged-in operator
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    /// Operator-controlled robot link toggle
    pub robot_connected: bool,
    /// Whether the position stream transport is currently up
    pub stream_connected: bool,
    /// Incremented on every update
    pub revision: u64,
}

impl ConsoleContext {
    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.session_token.is_some()
    }
}

/// Single-writer holder of the current [`ConsoleContext`].
///
/// Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    current: Arc<Mutex<Arc<ConsoleContext>>>,
}

impl ContextStore {
    pub fn new(initial: ConsoleContext) -> Self {
        Self {
            current: Arc::new(Mutex::new(Arc::new(initial))),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<ConsoleContext> {
        Arc::clone(&self.current.lock())
    }

    /// Apply `f` to a copy of the current context and publish the result.
    ///
    /// Updates are serialized; `f` must not call back into the store.
    pub fn update<F>(&self, f: F) -> Arc<ConsoleContext>
    where
        F: FnOnce(&mut ConsoleContext),
    {
        let mut guard = self.current.lock();
        let mut next = ConsoleContext::clone(&guard);
        f(&mut next);
        next.revision = guard.revision + 1;
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        debug!("Context revision {}", next.revision);
        next
    }

    pub fn login(&self, token: impl Into<String>) -> Arc<ConsoleContext> {
        let token = token.into();
        self.update(move |ctx| ctx.session_token = Some(token))
    }

    /// Clear the token. The robot link is dropped as well.
    pub fn logout(&self) -> Arc<ConsoleContext> {
        self.update(|ctx| {
            ctx.session_token = None;
            ctx.robot_connected = false;
        })
    }

    pub fn toggle_robot_connection(&self) -> Arc<ConsoleContext> {
        self.update(|ctx| ctx.robot_connected = !ctx.robot_connected)
    }

    pub fn set_stream_connected(&self, connected: bool) -> Arc<ConsoleContext> {
        self.update(|ctx| ctx.stream_connected = connected)
    }
}
