//! Database Connection and Setup
//!
//! SQLite-backed slot storage with migrations on open.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{SyncError, SyncResult};
use super::traits::PersistedStore;

/// SQLite implementation of PersistedStore
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

/// Open (or create) the database at `db_path`; `:memory:` is accepted
pub async fn init_store(db_path: &Path) -> SyncResult<SqliteStore> {
    let conn = Connection::open(db_path).map_err(|e| {
        SyncError::Persistence(format!("Failed to open {}: {}", db_path.display(), e))
    })?;

    run_migrations(&conn)?;
    log::info!("Slot store ready at {}", db_path.display());

    Ok(SqliteStore::new(Arc::new(Mutex::new(conn))))
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> SyncResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            slot TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        (),
    )
    .map_err(|e| SyncError::Persistence(format!("Migration failed: {}", e)))?;

    Ok(())
}

#[async_trait]
impl PersistedStore for SqliteStore {
    async fn load(&self, slot: &str) -> SyncResult<Option<String>> {
        let conn = self.conn.lock().await;

        conn.query_row(
            "SELECT value FROM kv_store WHERE slot = ?1",
            params![slot],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| SyncError::Persistence(e.to_string()))
    }

    async fn save(&self, slot: &str, value: &str) -> SyncResult<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO kv_store (slot, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
            params![slot, value, chrono::Utc::now().timestamp_millis()],
        )
        .map_err(|e| SyncError::Persistence(e.to_string()))?;

        Ok(())
    }
}
