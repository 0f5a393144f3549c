//! Route Session
//!
//! Owns the current route and decides, per write, whether the remote
//! service took it or it has to be queued and applied optimistically.
//!
//! Idle --create_route--> Active --finalise_route--> Idle

use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::domain::{
    FinaliseRequest, LatLng, Observation, ObservationNote, RouteCreate, RouteRecord, RouteUpdate,
    Task, Walk, WaypointCreate, WaypointRecord,
};
use crate::remote::RemoteService;
use crate::repository::{load_json, save_json, PersistedStore};
use super::connectivity::ConnectivityState;
use super::queue::TaskQueue;

/// Default storage slot for completed walks
pub const DEFAULT_HISTORY_SLOT: &str = "walk_history";

/// Everything the UI renders about the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Route being recorded (None = idle)
    pub current_route: Option<RouteRecord>,
    /// Points walked so far, in submission order
    pub current_path: Vec<LatLng>,
    /// Waypoints accepted for the current route
    pub waypoints: Vec<WaypointRecord>,
    /// Completed walks, most recent first
    pub history: Vec<Walk>,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        self.current_route.is_some()
    }

    fn current_route_id(&self) -> Option<&str> {
        self.current_route.as_ref().map(|r| r.id.as_str())
    }

    fn reset_accumulators(&mut self) {
        self.current_path.clear();
        self.waypoints.clear();
    }
}

pub struct RouteSession {
    state: watch::Sender<SessionState>,
    remote: Arc<dyn RemoteService>,
    queue: Arc<TaskQueue>,
    connectivity: Arc<ConnectivityState>,
    store: Arc<dyn PersistedStore>,
    history_slot: String,
    /// Whether the stored history has been read; until then it must not be overwritten
    history_restored: Mutex<bool>,
}

impl RouteSession {
    /// Build an idle session with history restored from storage
    pub async fn load(
        remote: Arc<dyn RemoteService>,
        queue: Arc<TaskQueue>,
        connectivity: Arc<ConnectivityState>,
        store: Arc<dyn PersistedStore>,
        history_slot: impl Into<String>,
    ) -> Self {
        let history_slot = history_slot.into();
        let stored = load_json::<Vec<Walk>>(store.as_ref(), &history_slot).await;
        let (history, restored) = match stored {
            Ok(history) => (history.unwrap_or_default(), true),
            Err(e) => {
                log::error!("Failed to read walk history, will retry before saving: {}", e);
                (Vec::new(), false)
            }
        };
        let (state, _) = watch::channel(SessionState {
            history,
            ..Default::default()
        });

        Self {
            state,
            remote,
            queue,
            connectivity,
            store,
            history_slot,
            history_restored: Mutex::new(restored),
        }
    }

    // ========================
    // Read side
    // ========================

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_route(&self) -> Option<RouteRecord> {
        self.state.borrow().current_route.clone()
    }

    pub fn history(&self) -> Vec<Walk> {
        self.state.borrow().history.clone()
    }

    /// In-progress walk built from the current route and path
    pub fn current_walk(&self) -> Option<Walk> {
        let state = self.state.borrow();
        state
            .current_route_id()
            .map(|id| {
                Walk::in_progress(id, &state.current_path, chrono::Utc::now().timestamp_millis())
            })
    }

    // ========================
    // Operations
    // ========================

    /// Start a new route. Offline, a provisional route stands in and is not retried.
    pub async fn create_route(&self, data: RouteCreate) -> RouteRecord {
        let route = match self.remote.create_route(&data).await {
            Ok(route) => route,
            Err(e) => {
                log::warn!("Backend not available, using provisional route: {}", e);
                self.connectivity.mark_offline();
                RouteRecord::provisional(&data)
            }
        };

        self.state.send_modify(|state| {
            state.current_route = Some(route.clone());
            state.reset_accumulators();
        });
        log::info!("Route {} started", route.id);

        route
    }

    /// Record a point on the current route; `None` when no route is active
    pub async fn submit_waypoint(
        &self,
        point: LatLng,
        text_note: Option<String>,
    ) -> Option<WaypointRecord> {
        let route_id = self.state.borrow().current_route_id()?.to_string();
        let payload = WaypointCreate {
            route_id,
            latitude: point.lat,
            longitude: point.lng,
            text_note,
        };

        let waypoint = match self.remote.submit_waypoint(&payload).await {
            Ok(mut waypoint) => {
                if waypoint.route_id.is_empty() {
                    waypoint.route_id = payload.route_id.clone();
                }
                waypoint
            }
            Err(e) => {
                log::warn!("Failed to submit waypoint, queueing for replay: {}", e);
                self.connectivity.mark_offline();
                let waypoint = WaypointRecord::provisional(&payload);
                self.queue.enqueue(Task::SubmitWaypoint(payload.clone())).await;
                waypoint
            }
        };

        self.state.send_if_modified(|state| {
            if state.current_route_id() != Some(payload.route_id.as_str()) {
                log::warn!(
                    "Route {} ended before waypoint {} landed",
                    payload.route_id,
                    waypoint.id
                );
                return false;
            }
            state.waypoints.push(waypoint.clone());
            state.current_path.push(point);
            true
        });

        Some(waypoint)
    }

    /// Fold a structured observation into a waypoint note. Media is not uploaded.
    pub async fn submit_observation(&self, observation: Observation) -> Option<WaypointRecord> {
        let note = match serde_json::to_string(&ObservationNote::from(&observation)) {
            Ok(note) => note,
            Err(e) => {
                log::warn!("Failed to encode observation, keeping plain text: {}", e);
                observation.content.clone()
            }
        };

        let point = LatLng {
            lat: observation.latitude,
            lng: observation.longitude,
        };
        self.submit_waypoint(point, Some(note)).await
    }

    /// End the current route. Always completes locally; a remote failure is queued.
    pub async fn finalise_route(&self) -> Option<Walk> {
        let route_id = self.state.borrow().current_route_id()?.to_string();
        let update = RouteUpdate::completed();

        if let Err(e) = self.remote.finalise_route(&route_id, &update).await {
            log::warn!("Failed to finalise route, queueing for replay: {}", e);
            self.connectivity.mark_offline();
            self.queue
                .enqueue(Task::FinaliseRoute(FinaliseRequest {
                    route_id: route_id.clone(),
                    status_update: update,
                }))
                .await;
        }

        let mut finished = None;
        self.state.send_if_modified(|state| {
            if state.current_route_id() != Some(route_id.as_str()) {
                return false;
            }
            let walk = Walk::completed(
                &route_id,
                &state.current_path,
                &state.waypoints,
                chrono::Utc::now().timestamp_millis(),
            );
            state.history.insert(0, walk.clone());
            state.current_route = None;
            state.reset_accumulators();
            finished = Some(walk);
            true
        });

        let walk = finished?;
        log::info!("Route {} finalised with {} points", route_id, walk.path.len());
        self.persist_history().await;
        Some(walk)
    }

    /// Save history, first merging in whatever was stored if the startup read failed
    async fn persist_history(&self) {
        let mut restored = self.history_restored.lock().await;
        if !*restored {
            match load_json::<Vec<Walk>>(self.store.as_ref(), &self.history_slot).await {
                Ok(stored) => {
                    let stored = stored.unwrap_or_default();
                    log::info!("Walk history readable again, merging {} walks", stored.len());
                    self.state.send_modify(|state| state.history.extend(stored));
                    *restored = true;
                }
                Err(e) => {
                    log::error!("Walk history still unreadable, keeping it in memory: {}", e);
                    return;
                }
            }
        }

        let history = self.history();
        if let Err(e) = save_json(self.store.as_ref(), &self.history_slot, &history).await {
            log::error!("Failed to persist walk history: {}", e);
        }
    }
}
