//! HTTP implementation of RemoteService
//!
//! JSON over REST paths relative to the configured base URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::domain::{
    RouteCreate, RouteRecord, RouteUpdate, SyncError, SyncResult, WaypointCreate, WaypointRecord,
};
use super::RemoteService;

pub struct HttpRemoteService {
    client: Client,
    base_url: String,
}

impl HttpRemoteService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> SyncResult<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| api_error(path, e))?;

        response.json::<R>().await.map_err(|e| api_error(path, e))
    }
}

fn api_error(path: &str, e: reqwest::Error) -> SyncError {
    log::warn!("API error on {}: {}", path, e);
    SyncError::TransientNetwork(e.to_string())
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn create_route(&self, data: &RouteCreate) -> SyncResult<RouteRecord> {
        self.post_json("routes/", data).await
    }

    async fn submit_waypoint(&self, payload: &WaypointCreate) -> SyncResult<WaypointRecord> {
        self.post_json("waypoints/", payload).await
    }

    async fn finalise_route(
        &self,
        route_id: &str,
        update: &RouteUpdate,
    ) -> SyncResult<RouteRecord> {
        self.post_json(&format!("routes/{}/finalise", route_id), update).await
    }

    async fn health_check(&self) -> SyncResult<()> {
        self.client
            .get(self.url("health"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| api_error("health", e))?;
        Ok(())
    }
}
