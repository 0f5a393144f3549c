//! Route Entity
//!
//! A recorded walk as known to the remote service.

use serde::{Deserialize, Serialize};
use super::entity::{provisional_id, Entity};

/// Status sent when a route is finalised
pub const STATUS_COMPLETED: &str = "completed";

/// Status given to routes created while offline
const STATUS_ACTIVE: &str = "active";

/// A single point on the walked path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Fields sent to create a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCreate {
    pub name: String,
    pub start_lat: f64,
    pub start_lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl RouteCreate {
    pub fn new(name: impl Into<String>, start_lat: f64, start_lon: f64) -> Self {
        Self {
            name: name.into(),
            start_lat,
            start_lon,
            end_lat: None,
            end_lon: None,
            distance_km: None,
        }
    }
}

/// Partial update applied to a route (finalisation uses `status` only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl RouteUpdate {
    pub fn completed() -> Self {
        Self {
            status: Some(STATUS_COMPLETED.to_string()),
            ..Default::default()
        }
    }
}

/// Route as returned by the remote service, or synthesized while offline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub id: String,
    pub name: String,
    pub start_lat: f64,
    pub start_lon: f64,
    #[serde(default)]
    pub end_lat: Option<f64>,
    #[serde(default)]
    pub end_lon: Option<f64>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
}

impl RouteRecord {
    /// Local stand-in for a route the server could not create
    pub fn provisional(data: &RouteCreate) -> Self {
        Self {
            id: provisional_id("route"),
            name: data.name.clone(),
            start_lat: data.start_lat,
            start_lon: data.start_lon,
            end_lat: data.end_lat,
            end_lon: data.end_lon,
            distance_km: data.distance_km,
            status: STATUS_ACTIVE.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl Entity for RouteRecord {
    fn id(&self) -> &str {
        &self.id
    }
}
