//! Deferred Task
//!
//! A write that could not reach the remote service, kept for replay.
//! Persisted as `{"kind": ..., "payload": ...}`.

use serde::{Deserialize, Serialize};
use std::fmt;
use super::route::{RouteCreate, RouteUpdate};
use super::waypoint::WaypointCreate;

/// Payload of a deferred finalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinaliseRequest {
    pub route_id: String,
    pub status_update: RouteUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum Task {
    CreateRoute(RouteCreate),
    SubmitWaypoint(WaypointCreate),
    FinaliseRoute(FinaliseRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    CreateRoute,
    SubmitWaypoint,
    FinaliseRoute,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::CreateRoute(_) => TaskKind::CreateRoute,
            Task::SubmitWaypoint(_) => TaskKind::SubmitWaypoint,
            Task::FinaliseRoute(_) => TaskKind::FinaliseRoute,
        }
    }
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::CreateRoute => "createRoute",
            TaskKind::SubmitWaypoint => "submitWaypoint",
            TaskKind::FinaliseRoute => "finaliseRoute",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
