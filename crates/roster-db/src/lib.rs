//! # roster-db
//!
//! libSQL persistence for Roster and the service that runs recruitment and
//! shipping commands against it.
//!
//! Every command follows load → pure reducer (from `roster-core`) → persist,
//! inside one SQL transaction, under that study's lock. Committed commands are
//! appended to a per-study JSONL trail.

pub mod commands;
pub mod error;
pub mod helpers;
pub mod locks;
mod migrations;
pub mod repos;
pub mod service;
pub mod trail;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for Roster state.
pub struct RosterDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl RosterDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let roster_db = Self { db, conn };
        roster_db.run_migrations().await?;
        tracing::debug!(path, "opened roster database");
        Ok(roster_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
