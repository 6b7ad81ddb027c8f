//! Cooperative cancellation for in-flight fetches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{DrishtiError, Result};

/// Shared cancellation flag.
///
/// Clones observe the same flag. Backends check it before and after
/// blocking work; the live view checks it again before applying a result
/// so nothing mutates state after teardown.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(DrishtiError::Cancelled)
        } else {
            Ok(())
        }
    }
}
