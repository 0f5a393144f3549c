//! Remote Service Layer
//!
//! The operations the sync core needs from the backend. Every failure,
//! whatever its cause, is reported as `SyncError::TransientNetwork`.

mod http;

use async_trait::async_trait;

use crate::domain::{
    RouteCreate, RouteRecord, RouteUpdate, SyncResult, WaypointCreate, WaypointRecord,
};

pub use http::HttpRemoteService;

#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Create a route; returns the server's record
    async fn create_route(&self, data: &RouteCreate) -> SyncResult<RouteRecord>;

    /// Store one waypoint against `payload.route_id`
    async fn submit_waypoint(&self, payload: &WaypointCreate) -> SyncResult<WaypointRecord>;

    /// Apply the final status update to a route
    async fn finalise_route(
        &self,
        route_id: &str,
        update: &RouteUpdate,
    ) -> SyncResult<RouteRecord>;

    /// Succeeds when the service is reachable
    async fn health_check(&self) -> SyncResult<()>;
}
