//! File-backed telemetry for replaying recorded sessions.
//!
//! A recording directory holds:
//!
//! | file           | content                                   |
//! |----------------|-------------------------------------------|
//! | `map.json`     | map descriptor (optional)                 |
//! | `latest.json`  | latest-position body, may be `null`       |
//! | `history.json` | JSON array of records, oldest first       |
//! | `live.jsonl`   | one stream record per line (optional)     |
//!
//! [`ReplayBackend`] applies the same window and limit rules as the real
//! history endpoint.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::Value;

use crate::error::Result;
use crate::frame::MapDescriptor;
use crate::session::CancelToken;
use crate::telemetry::record::{parse_records, parse_timestamp_ms};
use crate::telemetry::{HistoryQuery, HistoryWindow, PositionRecord, TelemetryBackend};

pub const MAP_FILE: &str = "map.json";
pub const LATEST_FILE: &str = "latest.json";
pub const HISTORY_FILE: &str = "history.json";
pub const LIVE_FILE: &str = "live.jsonl";

/// [`TelemetryBackend`] serving records loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct ReplayBackend {
    latest: Option<PositionRecord>,
    history: Vec<PositionRecord>,
}

impl ReplayBackend {
    pub fn new(latest: Option<PositionRecord>, history: Vec<PositionRecord>) -> Self {
        Self { latest, history }
    }

    /// Load `latest.json` and `history.json` from a recording directory.
    /// Missing files are treated as empty.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let latest = match read_optional(&dir.join(LATEST_FILE))? {
            Some(body) => {
                let value: Value = serde_json::from_str(&body)?;
                if value.is_null() {
                    None
                } else {
                    Some(serde_json::from_value(value)?)
                }
            }
            None => None,
        };
        let history = match read_optional(&dir.join(HISTORY_FILE))? {
            Some(body) => {
                let (records, skipped) = parse_records(&body)?;
                if skipped > 0 {
                    warn!("{}: skipped {} non-record entries", HISTORY_FILE, skipped);
                }
                records
            }
            None => Vec::new(),
        };
        info!(
            "Replay loaded from {}: latest={}, {} history record(s)",
            dir.display(),
            latest.is_some(),
            history.len()
        );
        Ok(Self { latest, history })
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl TelemetryBackend for ReplayBackend {
    fn latest(&self, cancel: &CancelToken) -> Result<Option<PositionRecord>> {
        cancel.check()?;
        Ok(self.latest.clone())
    }

    fn history(&self, query: &HistoryQuery, cancel: &CancelToken) -> Result<Vec<PositionRecord>> {
        cancel.check()?;
        let in_window: Vec<&PositionRecord> = self
            .history
            .iter()
            .filter(|r| match r.timestamp.as_ref().and_then(parse_timestamp_ms) {
                Some(ts) => query.window.contains(ts),
                None => query.window == HistoryWindow::default(),
            })
            .collect();
        let skip = in_window.len().saturating_sub(query.limit as usize);
        debug!(
            "Replay history: {} in window, returning {}",
            in_window.len(),
            in_window.len() - skip
        );
        Ok(in_window.into_iter().skip(skip).cloned().collect())
    }
}

/// Read `map.json` from a recording directory, if present.
pub fn load_map_descriptor(dir: impl AsRef<Path>) -> Result<Option<MapDescriptor>> {
    read_optional(&dir.as_ref().join(MAP_FILE))?
        .map(|body| MapDescriptor::from_json(&body))
        .transpose()
}

/// Read stream records from a JSON-lines file. Blank lines are skipped;
/// lines that are not record objects are dropped with a warning.
pub fn load_live_records(path: impl AsRef<Path>) -> Result<Vec<PositionRecord>> {
    let path = path.as_ref();
    let body = fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (n, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<PositionRecord>(line) {
            Ok(r) => records.push(r),
            Err(e) => warn!("{}:{}: dropped line: {}", path.display(), n + 1, e),
        }
    }
    Ok(records)
}

/// Path of the live file inside a recording directory.
pub fn live_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join(LIVE_FILE)
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(body) => Ok(Some(body)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
