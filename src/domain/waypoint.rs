//! Waypoint Entity
//!
//! A point submitted along the current route, optionally carrying a note.

use serde::{Deserialize, Serialize};
use super::entity::{provisional_id, Entity};

/// Payload sent to the remote service for one waypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointCreate {
    pub route_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_note: Option<String>,
}

/// Waypoint as stored by the remote service, or synthesized while offline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointRecord {
    pub id: String,
    #[serde(default)]
    pub route_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub text_note: Option<String>,
    #[serde(default)]
    pub stored_at: String,
}

impl WaypointRecord {
    /// Local stand-in mirroring what the server would have returned
    pub fn provisional(payload: &WaypointCreate) -> Self {
        Self {
            id: provisional_id("waypoint"),
            route_id: payload.route_id.clone(),
            latitude: payload.latitude,
            longitude: payload.longitude,
            text_note: payload.text_note.clone(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl Entity for WaypointRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Kind of observation captured on a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    #[default]
    Note,
    Photo,
    Voice,
    Text,
}

/// Structured observation; media stays on the device
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    pub kind: ObservationKind,
    pub content: String,
    pub image: Option<String>,
    pub audio: Option<String>,
}

/// What an observation looks like once folded into a waypoint's text note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationNote {
    #[serde(rename = "type")]
    pub kind: ObservationKind,
    pub text: String,
    pub has_image: bool,
    pub has_audio: bool,
}

impl From<&Observation> for ObservationNote {
    fn from(obs: &Observation) -> Self {
        Self {
            kind: obs.kind,
            text: obs.content.clone(),
            has_image: obs.image.is_some(),
            has_audio: obs.audio.is_some(),
        }
    }
}
