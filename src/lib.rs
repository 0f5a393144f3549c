//! Walk Sync Core
//!
//! Layered architecture:
//! - domain: Routes, waypoints, walks and deferred tasks
//! - repository: Durable slot storage (SQLite, in-memory)
//! - remote: The backend contract and its HTTP implementation
//! - sync: Connectivity monitor, task queue and route session

pub mod config;
pub mod domain;
pub mod remote;
pub mod repository;
pub mod sync;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use config::ClientConfig;
use domain::SyncResult;
use remote::{HttpRemoteService, RemoteService};
use repository::{init_store, MemoryStore, PersistedStore};
use sync::{ConnectivityMonitor, ConnectivityState, RouteSession, TaskQueue};

/// One instance of each sync component, wired together.
///
/// Construct once and hand out references; nothing here is global.
pub struct SyncClient {
    pub config: ClientConfig,
    pub connectivity: Arc<ConnectivityState>,
    pub queue: Arc<TaskQueue>,
    pub monitor: ConnectivityMonitor,
    pub session: RouteSession,
}

impl SyncClient {
    /// Wire the components around the given collaborators, restoring persisted state
    pub async fn new(
        config: ClientConfig,
        remote: Arc<dyn RemoteService>,
        store: Arc<dyn PersistedStore>,
    ) -> Self {
        let connectivity = Arc::new(ConnectivityState::new());
        let queue = Arc::new(
            TaskQueue::load(
                store.clone(),
                config.queue_slot.clone(),
                remote.clone(),
                connectivity.clone(),
            )
            .await,
        );
        let monitor = ConnectivityMonitor::new(
            remote.clone(),
            queue.clone(),
            connectivity.clone(),
            config.health_check_interval(),
        );
        let session = RouteSession::load(
            remote,
            queue.clone(),
            connectivity.clone(),
            store,
            config.history_slot.clone(),
        )
        .await;

        Self {
            config,
            connectivity,
            queue,
            monitor,
            session,
        }
    }

    /// HTTP backend plus SQLite storage; storage falls back to memory if it cannot open
    pub async fn connect(config: ClientConfig) -> SyncResult<Self> {
        let remote = Arc::new(HttpRemoteService::new(
            config.api_base_url.clone(),
            config.request_timeout(),
        )?);

        let store: Arc<dyn PersistedStore> = match init_store(&config.store_path).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                log::error!("Storage unavailable, pending tasks will not survive restart: {}", e);
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::new(config, remote, store).await)
    }

    /// Start logging to `<log_dir>/WalkSync.log`
    pub fn init_logging(log_dir: PathBuf) -> Result<(), String> {
        rolling_logger::init_logger(log_dir, "WalkSync")
    }

    /// Begin periodic health checks (first probe runs immediately)
    pub fn start(&self) {
        self.monitor.start();
    }

    pub fn shutdown(&self) {
        self.monitor.stop();
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }
}
