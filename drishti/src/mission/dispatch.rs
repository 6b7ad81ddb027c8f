//! Handing a goal request to whatever posts it.

use log::info;
use serde::Serialize;

use crate::error::{DrishtiError, Result};
use crate::state::ConsoleContext;

use super::goal::GoalRequest;
use super::schedule::MissionPlan;

/// Default goal endpoint path under the backend base URL.
pub const GOAL_PATH: &str = "/vehicle/goal";

/// A ready-to-send goal POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalDispatch {
    pub endpoint: String,
    /// Operator token, sent as `Authorization: Bearer …`
    #[serde(skip_serializing)]
    pub bearer_token: Option<String>,
    pub body: GoalRequest,
}

impl GoalDispatch {
    /// Build a dispatch carrying the context's session token.
    pub fn new(endpoint: impl Into<String>, context: &ConsoleContext, body: GoalRequest) -> Self {
        Self {
            endpoint: endpoint.into(),
            bearer_token: context.session_token.clone(),
            body,
        }
    }

    /// Request headers, `Authorization` only when a token is present.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Content-Type", "application/json".to_string())];
        if let Some(token) = &self.bearer_token {
            headers.push(("Authorization", format!("Bearer {}", token)));
        }
        headers
    }

    pub fn body_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.body)?)
    }
}

/// Join a base URL and the goal path without doubling slashes.
pub fn goal_endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Transport for goal dispatches.
pub trait GoalPublisher: Send + Sync {
    fn publish(&self, dispatch: &GoalDispatch) -> Result<()>;
}

/// Send a plan if it is due, refusing when the operator is not logged in.
///
/// Returns `Ok(false)` when the plan is scheduled for later.
pub fn launch(
    publisher: &dyn GoalPublisher,
    endpoint: &str,
    context: &ConsoleContext,
    plan: &MissionPlan,
    now: chrono::NaiveDateTime,
) -> Result<bool> {
    if !context.is_authenticated() {
        return Err(DrishtiError::Mission("not logged in".to_string()));
    }
    if !plan.schedule.is_due(now) {
        info!("Mission scheduled, not due yet: {:?}", plan.schedule);
        return Ok(false);
    }
    let dispatch = GoalDispatch::new(endpoint, context, plan.request.clone());
    publisher.publish(&dispatch)?;
    info!("Goal published to {}", dispatch.endpoint);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::PoseSnapshot;
    use crate::core::MapPose;
    use crate::mission::{MissionLaunch, MissionSchedule};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<GoalDispatch>>);

    impl GoalPublisher for Recorder {
        fn publish(&self, dispatch: &GoalDispatch) -> Result<()> {
            self.0.lock().push(dispatch.clone());
            Ok(())
        }
    }

    fn request() -> GoalRequest {
        let snapshot = PoseSnapshot {
            goal: Some(MapPose::new(1.0, 1.0, 0.0)),
            initial: None,
        };
        MissionLaunch::default().from_snapshot(&snapshot).unwrap()
    }

    fn logged_in() -> ConsoleContext {
        ConsoleContext {
            session_token: Some("tok".to_string()),
            ..ConsoleContext::default()
        }
    }

    fn now() -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            goal_endpoint("http://localhost:5000/", GOAL_PATH),
            "http://localhost:5000/vehicle/goal"
        );
    }

    #[test]
    fn test_headers_carry_bearer() {
        let d = GoalDispatch::new("x", &logged_in(), request());
        assert!(d.headers().contains(&("Authorization", "Bearer tok".to_string())));
        let anon = GoalDispatch::new("x", &ConsoleContext::default(), request());
        assert_eq!(anon.headers().len(), 1);
    }

    #[test]
    fn test_launch_immediate() {
        let rec = Recorder::default();
        let plan = MissionPlan::immediate(request());
        assert!(launch(&rec, "http://h/vehicle/goal", &logged_in(), &plan, now()).unwrap());
        assert_eq!(rec.0.lock().len(), 1);
    }

    #[test]
    fn test_launch_requires_login() {
        let rec = Recorder::default();
        let plan = MissionPlan::immediate(request());
        assert!(launch(&rec, "e", &ConsoleContext::default(), &plan, now()).is_err());
        assert!(rec.0.lock().is_empty());
    }

    #[test]
    fn test_launch_not_due() {
        let rec = Recorder::default();
        let schedule = MissionSchedule::planned(Some("2025-06-02"), Some("08:00")).unwrap();
        let plan = MissionPlan::scheduled(request(), schedule);
        assert!(!launch(&rec, "e", &logged_in(), &plan, now()).unwrap());
        assert!(rec.0.lock().is_empty());
    }
}
