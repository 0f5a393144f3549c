//! Domain Layer
//!
//! Route, waypoint and walk entities plus the deferred task model.
//! This layer has NO I/O.

mod entity;
mod route;
mod waypoint;
mod walk;
mod task;

pub use entity::{Entity, SyncError, SyncResult, PROVISIONAL_PREFIX};
pub use route::{LatLng, RouteCreate, RouteRecord, RouteUpdate, STATUS_COMPLETED};
pub use waypoint::{Observation, ObservationKind, ObservationNote, WaypointCreate, WaypointRecord};
pub use walk::{Walk, WalkObservation};
pub use task::{FinaliseRequest, Task, TaskKind};
