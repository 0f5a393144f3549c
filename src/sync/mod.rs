//! Sync Layer
//!
//! Connectivity monitoring, the deferred task queue and the route session.

mod connectivity;
mod queue;
mod session;

#[cfg(test)]
mod tests;

pub use connectivity::{ConnectivityMonitor, ConnectivityState, DEFAULT_HEALTH_INTERVAL};
pub use queue::{FlushReport, TaskQueue, DEFAULT_QUEUE_SLOT};
pub use session::{RouteSession, SessionState, DEFAULT_HISTORY_SLOT};
