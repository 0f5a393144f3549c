//! Task Queue
//!
//! Ordered, persisted buffer of writes that failed to reach the remote
//! service. The whole queue is written through to storage on every change.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{SyncResult, Task};
use crate::remote::RemoteService;
use crate::repository::{load_json, save_json, PersistedStore};
use super::connectivity::ConnectivityState;

/// Default storage slot for the queue
pub const DEFAULT_QUEUE_SLOT: &str = "sync_tasks";

/// What a single flush did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Tasks the remote service accepted
    pub dispatched: usize,
    /// Tasks pushed back after the first failure
    pub requeued: usize,
}

struct QueueState {
    tasks: Vec<Task>,
    /// False until the stored queue has been read; nothing is written before that
    restored: bool,
}

pub struct TaskQueue {
    state: Mutex<QueueState>,
    /// Held for the whole of a flush so two replays never overlap
    flush_lock: Mutex<()>,
    store: Arc<dyn PersistedStore>,
    slot: String,
    remote: Arc<dyn RemoteService>,
    connectivity: Arc<ConnectivityState>,
}

impl TaskQueue {
    /// Build the queue, restoring whatever was pending when the process last stopped.
    ///
    /// If storage cannot be read yet, the queue starts empty and keeps retrying the
    /// read on each later write; it does not overwrite the stored queue until then.
    pub async fn load(
        store: Arc<dyn PersistedStore>,
        slot: impl Into<String>,
        remote: Arc<dyn RemoteService>,
        connectivity: Arc<ConnectivityState>,
    ) -> Self {
        let queue = Self {
            state: Mutex::new(QueueState {
                tasks: Vec::new(),
                restored: false,
            }),
            flush_lock: Mutex::new(()),
            store,
            slot: slot.into(),
            remote,
            connectivity,
        };

        queue.lock_restored().await;
        queue
    }

    /// Append to the tail and persist. Never fails; storage errors are logged.
    pub async fn enqueue(&self, task: Task) {
        let mut state = self.lock_restored().await;
        log::debug!(
            "Queueing {} task ({} already pending)",
            task.kind(),
            state.tasks.len()
        );
        state.tasks.push(task);
        self.persist(&state).await;
    }

    /// Copy of the pending tasks in replay order
    pub async fn pending(&self) -> Vec<Task> {
        self.state.lock().await.tasks.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.tasks.is_empty()
    }

    /// Replay pending tasks in order.
    ///
    /// Only the tasks pending when the flush starts are replayed; anything
    /// enqueued meanwhile waits for a later flush. Each task leaves the queue
    /// (in memory and in storage) only once the remote service accepts it, so a
    /// flush dropped part-way loses nothing and the interrupted task is sent again.
    /// The first failure moves the failed task and everything after it behind the
    /// tasks enqueued meanwhile, marks the service offline and stops.
    pub async fn flush(&self) -> FlushReport {
        let _flushing = self.flush_lock.lock().await;

        if !self.connectivity.is_online() {
            return FlushReport::default();
        }

        let batch = self.lock_restored().await.tasks.len();
        if batch == 0 {
            return FlushReport::default();
        }

        log::info!("Processing {} pending offline tasks", batch);

        let mut dispatched = 0;
        while dispatched < batch {
            // Flushes are serialized and enqueue only appends, so the head is ours
            let Some(task) = self.state.lock().await.tasks.first().cloned() else {
                break;
            };

            if let Err(e) = self.dispatch(&task).await {
                log::warn!("Failed to replay {} task, pushing back: {}", task.kind(), e);

                let requeued = batch - dispatched;
                {
                    let mut state = self.state.lock().await;
                    let end = requeued.min(state.tasks.len());
                    let unfinished: Vec<Task> = state.tasks.drain(..end).collect();
                    state.tasks.extend(unfinished);
                    self.persist(&state).await;
                }
                self.connectivity.mark_offline();

                return FlushReport { dispatched, requeued };
            }

            let mut state = self.state.lock().await;
            state.tasks.remove(0);
            self.persist(&state).await;
            dispatched += 1;
        }

        log::info!("Replayed {} offline tasks", dispatched);
        FlushReport {
            dispatched,
            requeued: 0,
        }
    }

    async fn dispatch(&self, task: &Task) -> SyncResult<()> {
        log::debug!("Replaying {} task", task.kind());
        match task {
            Task::CreateRoute(data) => self.remote.create_route(data).await.map(|_| ()),
            Task::SubmitWaypoint(payload) => self.remote.submit_waypoint(payload).await.map(|_| ()),
            Task::FinaliseRoute(request) => self
                .remote
                .finalise_route(&request.route_id, &request.status_update)
                .await
                .map(|_| ()),
        }
    }

    /// Lock the state, first merging in the stored queue if it has not been read yet
    async fn lock_restored(&self) -> MutexGuard<'_, QueueState> {
        let mut state = self.state.lock().await;
        if state.restored {
            return state;
        }

        match load_json::<Vec<Task>>(self.store.as_ref(), &self.slot).await {
            Ok(stored) => {
                let stored = stored.unwrap_or_default();
                if !stored.is_empty() {
                    log::info!("Restored {} pending offline tasks", stored.len());
                }
                // Stored tasks are older than anything queued since start
                state.tasks.splice(0..0, stored);
                state.restored = true;
            }
            Err(e) => {
                log::error!(
                    "Failed to read task queue, holding writes until it can be read: {}",
                    e
                );
            }
        }
        state
    }

    async fn persist(&self, state: &QueueState) {
        if !state.restored {
            log::warn!(
                "Task queue not read from storage yet, keeping {} tasks in memory",
                state.tasks.len()
            );
            return;
        }
        if let Err(e) = save_json(self.store.as_ref(), &self.slot, &state.tasks).await {
            log::error!("Failed to persist task queue, keeping it in memory: {}", e);
        }
    }
}
