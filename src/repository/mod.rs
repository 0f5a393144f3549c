//! Repository Layer
//!
//! Durable key/value slots that survive process restarts.

mod traits;
mod db;
mod memory;


pub use traits::{load_json, save_json, PersistedStore};
pub use db::{init_store, SqliteStore};
pub use memory::MemoryStore;
