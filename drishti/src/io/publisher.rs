//! Goal publisher that records dispatches as JSON lines.
//!
//! Used for dry runs and audits where no vehicle is attached.

use std::io::Write;

use parking_lot::Mutex;
use serde_json::json;

use crate::error::Result;
use crate::mission::{GoalDispatch, GoalPublisher};

/// Writes one JSON object per dispatch: `{"endpoint", "authorized", "body"}`.
///
/// The bearer token itself is never written.
pub struct JsonlPublisher<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonlPublisher<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> GoalPublisher for JsonlPublisher<W> {
    fn publish(&self, dispatch: &GoalDispatch) -> Result<()> {
        let line = json!({
            "endpoint": dispatch.endpoint,
            "authorized": dispatch.bearer_token.is_some(),
            "body": dispatch.body,
        });
        let mut out = self.out.lock();
        serde_json::to_writer(&mut *out, &line)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}
