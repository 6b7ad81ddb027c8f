//! Position records as they arrive from REST and the event stream.
//!
//! Records are decoded leniently: a record with a missing or non-numeric
//! coordinate is dropped on its own without failing the batch it came in.
//!
//! # Wire format
//!
//! ```json
//! {"ts": "2025-03-01T10:15:02.120", "lat": 43.6045, "lng": 1.4442, "topic": "gnss/fix"}
//! ```
//!
//! - `ts` or `timestamp`: epoch milliseconds (number or numeric string) or
//!   an ISO-8601 string; strings without an offset are UTC
//! - `lat`/`lng` for geographic tracks, `x`/`y` for map-frame tracks

use chrono::{DateTime, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{GeoPoint, Point2D, TelemetrySample, TrackCoordinate};
use crate::error::{DrishtiError, Result};

/// One undecoded position record.
///
/// Fields are kept as raw JSON so that validation can drop a bad record
/// instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    #[serde(alias = "ts", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Value>,
    /// Upstream topic the position came from, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl PositionRecord {
    /// Geographic record with a millisecond timestamp.
    pub fn geo(lat: f64, lng: f64, timestamp_ms: u64) -> Self {
        Self {
            timestamp: Some(Value::from(timestamp_ms)),
            lat: Some(Value::from(lat)),
            lng: Some(Value::from(lng)),
            ..Self::default()
        }
    }

    /// Map-frame record with a millisecond timestamp.
    pub fn planar(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            timestamp: Some(Value::from(timestamp_ms)),
            x: Some(Value::from(x)),
            y: Some(Value::from(y)),
            ..Self::default()
        }
    }

    /// Timestamp in epoch milliseconds, if present and parseable.
    pub fn timestamp_ms(&self) -> Option<u64> {
        self.timestamp.as_ref().and_then(parse_timestamp_ms)
    }

    /// Validated sample, or `None` when a coordinate is missing or not a
    /// finite number.
    pub fn sample<P: RecordCoordinate>(&self) -> Option<TelemetrySample<P>> {
        let position = P::from_record(self)?;
        Some(TelemetrySample {
            position,
            timestamp_ms: self.timestamp_ms(),
        })
    }
}

/// A coordinate type that can be read out of a [`PositionRecord`].
pub trait RecordCoordinate: TrackCoordinate {
    fn from_record(record: &PositionRecord) -> Option<Self>;
}

impl RecordCoordinate for GeoPoint {
    fn from_record(record: &PositionRecord) -> Option<Self> {
        Some(GeoPoint::new(
            number(record.lat.as_ref())?,
            number(record.lng.as_ref())?,
        ))
    }
}

impl RecordCoordinate for Point2D {
    fn from_record(record: &PositionRecord) -> Option<Self> {
        Some(Point2D::new(
            number(record.x.as_ref())?,
            number(record.y.as_ref())?,
        ))
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    value?.as_f64().filter(|v| v.is_finite())
}

/// Parse an epoch-millisecond or ISO-8601 timestamp.
///
/// Naive ISO strings (no offset) are taken as UTC. Negative or
/// fractional-before-epoch values are rejected.
pub fn parse_timestamp_ms(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => {
            if let Some(ms) = n.as_u64() {
                return Some(ms);
            }
            let f = n.as_f64()?;
            (f.is_finite() && f >= 0.0).then(|| f as u64)
        }
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<u64> {
    if let Ok(ms) = s.parse::<u64>() {
        return Some(ms);
    }
    let millis = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.timestamp_millis()
    } else {
        let iso = s.replacen(' ', "T", 1);
        iso.parse::<NaiveDateTime>().ok()?.and_utc().timestamp_millis()
    };
    u64::try_from(millis).ok()
}

/// Samples decoded from a batch plus how many records were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<P> {
    pub samples: Vec<TelemetrySample<P>>,
    pub dropped: usize,
}

/// Validate records into samples, counting the ones that fail.
pub fn collect_samples<P: RecordCoordinate>(records: &[PositionRecord]) -> Decoded<P> {
    let samples: Vec<TelemetrySample<P>> = records.iter().filter_map(|r| r.sample()).collect();
    Decoded {
        dropped: records.len() - samples.len(),
        samples,
    }
}

/// Parse a JSON array body into records, skipping entries that are not
/// record objects. Returns the records and the number skipped.
pub fn parse_records(body: &str) -> Result<(Vec<PositionRecord>, usize)> {
    let entries: Vec<Value> = serde_json::from_str(body)?;
    let total = entries.len();
    let records: Vec<PositionRecord> = entries
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    let skipped = total - records.len();
    Ok((records, skipped))
}

/// Decode a history response (a JSON array of records, oldest first).
///
/// The body itself must be an array; individual bad entries are dropped.
pub fn decode_history<P: RecordCoordinate>(body: &str) -> Result<Decoded<P>> {
    let (records, skipped) = parse_records(body)?;
    let mut decoded = collect_samples(&records);
    decoded.dropped += skipped;
    if decoded.dropped > 0 {
        warn!(
            "Dropped {} malformed history record(s) of {}",
            decoded.dropped,
            records.len() + skipped
        );
    }
    Ok(decoded)
}

/// Decode a latest-position response. `null` or a malformed record is
/// `Ok(None)`; a body that is not JSON is an error.
pub fn decode_latest<P: RecordCoordinate>(body: &str) -> Result<Option<TelemetrySample<P>>> {
    let value: Value = serde_json::from_str(body)?;
    if value.is_null() {
        return Ok(None);
    }
    let record: PositionRecord = serde_json::from_value(value)
        .map_err(|e| DrishtiError::Decode(format!("latest position: {}", e)))?;
    Ok(record.sample())
}
