//! Test doubles shared by the sync tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::{
    RouteCreate, RouteRecord, RouteUpdate, SyncError, SyncResult, Task, WaypointCreate,
    WaypointRecord,
};
use crate::remote::RemoteService;
use crate::repository::{MemoryStore, PersistedStore};

/// A write the remote service received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateRoute(RouteCreate),
    SubmitWaypoint(WaypointCreate),
    FinaliseRoute(String, RouteUpdate),
}

/// Remote service whose failures are scripted by the test
pub struct ScriptedRemote {
    calls: Mutex<Vec<Call>>,
    reachable: AtomicBool,
    writes: AtomicUsize,
    fail_at: Mutex<Option<usize>>,
    health_checks: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reachable: AtomicBool::new(true),
            writes: AtomicUsize::new(0),
            fail_at: Mutex::new(None),
            health_checks: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    /// Unreachable: every call, health checks included, fails
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Fail only the n-th write (1-indexed) counted from now
    pub fn fail_write_at(&self, n: usize) {
        let base = self.writes.load(Ordering::SeqCst);
        *self.fail_at.lock().unwrap() = Some(base + n);
    }

    /// Make every later write wait for one `notify_one` on the returned handle
    pub fn hold_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Let writes through again
    pub fn release_writes(&self) {
        *self.gate.lock().unwrap() = None;
    }

    pub fn write_calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }

    async fn record(&self, call: Call) -> SyncResult<usize> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(call);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if !self.reachable.load(Ordering::SeqCst) {
            return Err(SyncError::TransientNetwork("connection refused".to_string()));
        }
        if *self.fail_at.lock().unwrap() == Some(n) {
            return Err(SyncError::TransientNetwork("422 Unprocessable Entity".to_string()));
        }
        Ok(n)
    }
}

#[async_trait]
impl RemoteService for ScriptedRemote {
    async fn create_route(&self, data: &RouteCreate) -> SyncResult<RouteRecord> {
        let n = self.record(Call::CreateRoute(data.clone())).await?;
        Ok(RouteRecord {
            id: format!("srv-route-{}", n),
            name: data.name.clone(),
            start_lat: data.start_lat,
            start_lon: data.start_lon,
            end_lat: data.end_lat,
            end_lon: data.end_lon,
            distance_km: data.distance_km,
            status: "active".to_string(),
            created_at: "2024-05-01T09:00:00Z".to_string(),
        })
    }

    async fn submit_waypoint(&self, payload: &WaypointCreate) -> SyncResult<WaypointRecord> {
        let n = self.record(Call::SubmitWaypoint(payload.clone())).await?;
        // The server response carries no route id
        Ok(WaypointRecord {
            id: format!("srv-wp-{}", n),
            route_id: String::new(),
            latitude: payload.latitude,
            longitude: payload.longitude,
            text_note: payload.text_note.clone(),
            stored_at: "2024-05-01T09:05:00Z".to_string(),
        })
    }

    async fn finalise_route(
        &self,
        route_id: &str,
        update: &RouteUpdate,
    ) -> SyncResult<RouteRecord> {
        let n = self
            .record(Call::FinaliseRoute(route_id.to_string(), update.clone()))
            .await?;
        Ok(RouteRecord {
            id: route_id.to_string(),
            name: format!("finalised-{}", n),
            start_lat: 0.0,
            start_lon: 0.0,
            end_lat: None,
            end_lon: None,
            distance_km: None,
            status: update.status.clone().unwrap_or_default(),
            created_at: "2024-05-01T09:00:00Z".to_string(),
        })
    }

    async fn health_check(&self) -> SyncResult<()> {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::TransientNetwork("connection refused".to_string()))
        }
    }
}

/// In-memory storage whose next reads can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_loads: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_loads(&self, n: usize) {
        self.failing_loads.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersistedStore for FlakyStore {
    async fn load(&self, slot: &str) -> SyncResult<Option<String>> {
        let failing = self.failing_loads.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_loads.store(failing - 1, Ordering::SeqCst);
            return Err(SyncError::Persistence("database is locked".to_string()));
        }
        self.inner.load(slot).await
    }

    async fn save(&self, slot: &str, value: &str) -> SyncResult<()> {
        self.inner.save(slot, value).await
    }
}

/// Storage that can neither be read nor written
pub struct FailingStore;

#[async_trait]
impl PersistedStore for FailingStore {
    async fn load(&self, _slot: &str) -> SyncResult<Option<String>> {
        Err(SyncError::Persistence("disk unavailable".to_string()))
    }

    async fn save(&self, _slot: &str, _value: &str) -> SyncResult<()> {
        Err(SyncError::Persistence("disk full".to_string()))
    }
}

pub fn waypoint_task(route_id: &str, latitude: f64) -> Task {
    Task::SubmitWaypoint(WaypointCreate {
        route_id: route_id.to_string(),
        latitude,
        longitude: -122.0,
        text_note: None,
    })
}
