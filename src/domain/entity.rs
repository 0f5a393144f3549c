//! Domain Layer - Core Entity Trait
//!
//! Every record the client keeps carries a string id which is either issued
//! by the remote service or synthesized locally while offline.

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Prefix marking ids generated on the device
pub const PROVISIONAL_PREFIX: &str = "local-";

static LOCAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Core trait for all synchronized entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// Returns the entity's identifier
    fn id(&self) -> &str;

    /// True when the id was synthesized locally and never confirmed by the server
    fn is_provisional(&self) -> bool {
        self.id().starts_with(PROVISIONAL_PREFIX)
    }
}

/// Build a provisional id such as `local-route-1718000000000-3`
pub(crate) fn provisional_id(kind: &str) -> String {
    let seq = LOCAL_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}{}-{}-{}",
        PROVISIONAL_PREFIX,
        kind,
        chrono::Utc::now().timestamp_millis(),
        seq
    )
}

/// Common result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the sync core's collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The remote call did not complete or was rejected; any cause lands here
    #[error("remote call failed: {0}")]
    TransientNetwork(String),

    /// Local storage could not be read or written
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(String),
}
