//! Walk Entity
//!
//! A completed (or in-progress) walk as shown in the history list.

use serde::{Deserialize, Serialize};
use super::route::LatLng;
use super::waypoint::{ObservationKind, WaypointRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkObservation {
    #[serde(rename = "type")]
    pub kind: ObservationKind,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Walk {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub title: String,
    pub mood: String,
    pub path: Vec<LatLng>,
    pub observations: Vec<WalkObservation>,
    /// Kilometres
    pub distance: f64,
    /// Minutes
    pub duration: u64,
    pub is_active: bool,
}

impl Walk {
    /// History entry for a route that just ended.
    ///
    /// Distance and duration are rough per-point estimates, not geodesic.
    pub fn completed(
        route_id: &str,
        path: &[LatLng],
        waypoints: &[WaypointRecord],
        now_ms: i64,
    ) -> Self {
        let points = path.len();
        Self {
            id: route_id.to_string(),
            start_time: now_ms - points as i64 * 60_000,
            end_time: Some(now_ms),
            title: "New Walk".to_string(),
            mood: "🌟".to_string(),
            path: path.to_vec(),
            observations: waypoints
                .iter()
                .map(|w| WalkObservation {
                    kind: ObservationKind::Note,
                    text: w.text_note.clone(),
                })
                .collect(),
            distance: points as f64 * 0.5,
            duration: points as u64,
            is_active: false,
        }
    }

    /// View of the route still being recorded
    pub fn in_progress(route_id: &str, path: &[LatLng], now_ms: i64) -> Self {
        Self {
            id: route_id.to_string(),
            start_time: now_ms,
            end_time: None,
            title: "Current Journey".to_string(),
            mood: "🚶".to_string(),
            path: path.to_vec(),
            observations: Vec::new(),
            distance: 0.0,
            duration: 0,
            is_active: true,
        }
    }
}
