//! Offline Walk Scenarios
//!
//! A route recorded entirely offline, then replayed once the service returns.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::domain::{
        Entity, FinaliseRequest, LatLng, RouteCreate, RouteUpdate, Task, WaypointCreate,
    };
    use crate::repository::{MemoryStore, PersistedStore};
    use crate::sync::{
        ConnectivityMonitor, ConnectivityState, RouteSession, TaskQueue, DEFAULT_HEALTH_INTERVAL,
        DEFAULT_HISTORY_SLOT, DEFAULT_QUEUE_SLOT,
    };
    use crate::testing::{Call, ScriptedRemote};

    struct Client {
        remote: Arc<ScriptedRemote>,
        connectivity: Arc<ConnectivityState>,
        queue: Arc<TaskQueue>,
        monitor: ConnectivityMonitor,
        session: RouteSession,
    }

    async fn online_client() -> Client {
        let remote = Arc::new(ScriptedRemote::new());
        let store: Arc<dyn PersistedStore> = Arc::new(MemoryStore::new());
        let connectivity = Arc::new(ConnectivityState::new());
        let queue = Arc::new(
            TaskQueue::load(store.clone(), DEFAULT_QUEUE_SLOT, remote.clone(), connectivity.clone())
                .await,
        );
        let monitor = ConnectivityMonitor::new(
            remote.clone(),
            queue.clone(),
            connectivity.clone(),
            DEFAULT_HEALTH_INTERVAL,
        );
        let session = RouteSession::load(
            remote.clone(),
            queue.clone(),
            connectivity.clone(),
            store,
            DEFAULT_HISTORY_SLOT,
        )
        .await;

        assert!(monitor.check_health().await);
        Client {
            remote,
            connectivity,
            queue,
            monitor,
            session,
        }
    }

    fn expected_waypoint(route_id: &str) -> WaypointCreate {
        WaypointCreate {
            route_id: route_id.to_string(),
            latitude: 37.0,
            longitude: -122.0,
            text_note: None,
        }
    }

    #[tokio::test]
    async fn test_offline_walk_replays_after_reconnect() {
        let client = online_client().await;
        client.remote.set_reachable(false);

        // A: route created while the service is down
        let route = client.session.create_route(RouteCreate::new("X", 1.0, 1.0)).await;
        assert!(route.is_provisional());
        assert!(client.session.snapshot().is_active());
        assert!(!client.connectivity.is_online());

        // B: waypoint applied locally and queued
        let waypoint = client
            .session
            .submit_waypoint(LatLng { lat: 37.0, lng: -122.0 }, None)
            .await
            .unwrap();
        assert_eq!(waypoint.route_id, route.id);
        assert_eq!(client.session.snapshot().waypoints, vec![waypoint]);
        assert_eq!(
            client.queue.pending().await,
            vec![Task::SubmitWaypoint(expected_waypoint(&route.id))]
        );

        // C: service is back; the queued waypoint is replayed
        client.remote.set_reachable(true);
        assert!(client.monitor.check_health().await);
        assert!(client.queue.is_empty().await);
        assert!(client.connectivity.is_online());
        assert_eq!(
            client.remote.write_calls().last(),
            Some(&Call::SubmitWaypoint(expected_waypoint(&route.id)))
        );
    }

    #[tokio::test]
    async fn test_offline_finalise_archives_and_queues() {
        let client = online_client().await;
        client.remote.set_reachable(false);

        let route = client.session.create_route(RouteCreate::new("X", 1.0, 1.0)).await;
        let waypoint = client
            .session
            .submit_waypoint(LatLng { lat: 37.0, lng: -122.0 }, Some("pond".to_string()))
            .await
            .unwrap();

        // D: finalise while offline
        let walk = client.session.finalise_route().await.unwrap();

        let state = client.session.snapshot();
        assert!(state.current_route.is_none());
        assert!(state.current_path.is_empty());
        assert!(state.waypoints.is_empty());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0], walk);
        assert_eq!(walk.path, vec![LatLng { lat: 37.0, lng: -122.0 }]);
        assert_eq!(walk.observations[0].text, waypoint.text_note);

        let pending = client.queue.pending().await;
        assert_eq!(pending.len(), 2);
        assert_eq!(
            pending[1],
            Task::FinaliseRoute(FinaliseRequest {
                route_id: route.id.clone(),
                status_update: RouteUpdate::completed(),
            })
        );

        // Replay keeps the causal order: waypoint before finalisation
        client.remote.set_reachable(true);
        client.monitor.check_health().await;
        let calls = client.remote.write_calls();
        let replayed = &calls[calls.len() - 2..];
        assert!(matches!(replayed[0], Call::SubmitWaypoint(_)));
        assert!(matches!(replayed[1], Call::FinaliseRoute(ref id, _) if id == &route.id));
        assert!(client.queue.is_empty().await);
    }
}
