//! Immediate vs. deferred missions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{DrishtiError, Result};

use super::goal::GoalRequest;

/// When a mission should be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum MissionSchedule {
    /// Publish the goal now
    Immediate,
    /// Publish at a wall-clock time as entered by the operator
    At(NaiveDateTime),
}

impl MissionSchedule {
    /// Parse a deferred schedule from form fields.
    ///
    /// `date` is `YYYY-MM-DD`, `time` is `HH:MM` (seconds optional). Both
    /// are required.
    pub fn planned(date: Option<&str>, time: Option<&str>) -> Result<Self> {
        let date = date.map(str::trim).filter(|s| !s.is_empty());
        let time = time.map(str::trim).filter(|s| !s.is_empty());
        let (Some(date), Some(time)) = (date, time) else {
            return Err(DrishtiError::Mission("date and time required".to_string()));
        };
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| DrishtiError::Mission(format!("invalid date '{}': {}", date, e)))?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|e| DrishtiError::Mission(format!("invalid time '{}': {}", time, e)))?;
        Ok(Self::At(date.and_time(time)))
    }

    /// Whether the mission should be sent at `now`.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        match self {
            Self::Immediate => true,
            Self::At(at) => now >= *at,
        }
    }
}

/// A goal request together with when to send it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionPlan {
    pub request: GoalRequest,
    pub schedule: MissionSchedule,
}

impl MissionPlan {
    pub fn immediate(request: GoalRequest) -> Self {
        Self {
            request,
            schedule: MissionSchedule::Immediate,
        }
    }

    pub fn scheduled(request: GoalRequest, schedule: MissionSchedule) -> Self {
        Self { request, schedule }
    }
}
