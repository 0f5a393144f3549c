//! Connectivity Monitor
//!
//! Owns the process-wide online flag and the periodic health probe that
//! replays the task queue when the service comes back.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::remote::RemoteService;
use super::queue::TaskQueue;

/// Default time between health probes
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Shared online/offline signal.
///
/// Starts offline: nothing is known about the service until the first probe,
/// and the first successful probe then counts as a reconnect.
pub struct ConnectivityState {
    online: watch::Sender<bool>,
}

impl ConnectivityState {
    pub fn new() -> Self {
        let (online, _) = watch::channel(false);
        Self { online }
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Receiver notified on every online/offline flip
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }

    /// Flip to offline; no-op when already offline
    pub fn mark_offline(&self) {
        let changed = self.online.send_if_modified(|online| std::mem::replace(online, false));
        if changed {
            log::warn!("Remote service unreachable, switching to offline mode");
        }
    }

    /// Flip to online; returns true only on the offline -> online edge
    pub(crate) fn mark_online(&self) -> bool {
        let changed = self.online.send_if_modified(|online| !std::mem::replace(online, true));
        if changed {
            log::info!("Remote service reachable again");
        }
        changed
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new()
    }
}

/// The part of the monitor that runs inside the timer task
#[derive(Clone)]
struct HealthProbe {
    remote: Arc<dyn RemoteService>,
    queue: Arc<TaskQueue>,
    connectivity: Arc<ConnectivityState>,
}

impl HealthProbe {
    async fn check(&self) -> bool {
        match self.remote.health_check().await {
            Ok(()) => {
                if self.connectivity.mark_online() {
                    self.queue.flush().await;
                }
                true
            }
            Err(e) => {
                log::debug!("Health check failed: {}", e);
                self.connectivity.mark_offline();
                false
            }
        }
    }
}

pub struct ConnectivityMonitor {
    probe: HealthProbe,
    interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    pub fn new(
        remote: Arc<dyn RemoteService>,
        queue: Arc<TaskQueue>,
        connectivity: Arc<ConnectivityState>,
        interval: Duration,
    ) -> Self {
        Self {
            probe: HealthProbe {
                remote,
                queue,
                connectivity,
            },
            interval,
            timer: Mutex::new(None),
        }
    }

    /// Probe now and then on every interval tick. Must run inside a tokio runtime.
    pub fn start(&self) {
        let probe = self.probe.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately
                ticker.tick().await;
                probe.check().await;
            }
        });

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timer.replace(handle) {
            log::warn!("Health check timer started twice; stopping the previous one");
            previous.abort();
        }
        log::info!("Health checks every {}s", period.as_secs());
    }

    /// Stop the periodic probe; safe to call when not running
    pub fn stop(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
            log::info!("Health checks stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Probe once. Replays the queue when this probe is a reconnect.
    pub async fn check_health(&self) -> bool {
        self.probe.check().await
    }

    /// Fast path for writers that just saw a remote failure
    pub fn mark_offline(&self) {
        self.probe.connectivity.mark_offline();
    }

    pub fn is_online(&self) -> bool {
        self.probe.connectivity.is_online()
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
