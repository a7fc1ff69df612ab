//! Service layer running Roster commands against the database.
//!
//! `RosterService` wraps `RosterDb` (raw database access), `TrailWriter`
//! (JSONL persistence), the injected `Clock` and `EnrollmentSource`, and the
//! recruitment policy. Commands are implemented as `impl RosterService` in
//! [`crate::commands`]; read queries live beside their repos.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use roster_config::RosterConfig;
use roster_core::clock::{Clock, SystemClock};
use roster_core::controller::RecruitmentPolicy;
use roster_core::enums::{EntityType, TrailOp};
use roster_core::factory::{EnrollmentSource, PlaceholderEnrollments};
use roster_core::trail::TrailOperation;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use crate::RosterDb;
use crate::error::DatabaseError;
use crate::helpers::fmt_datetime;
use crate::locks::StudyLocks;
use crate::trail::writer::TrailWriter;

/// Waitlist assumed by `initialize_study` when none is given and no config
/// is loaded.
pub const DEFAULT_WAITLIST: u32 = 50;

/// Runs recruitment and shipping commands with per-study serialization.
///
/// Every command follows this protocol:
/// 1. Take the study's lock, then the connection write gate
/// 2. Begin a transaction and load the study
/// 3. Apply the pure reducer from `roster-core`
/// 4. Write the changed rows
/// 5. Append the JSONL trail operations
/// 6. Commit, or roll back if any step failed
pub struct RosterService {
    db: RosterDb,
    trail: TrailWriter,
    clock: Arc<dyn Clock>,
    source: Arc<dyn EnrollmentSource>,
    policy: RecruitmentPolicy,
    default_waitlist: u32,
    locks: StudyLocks,
    write_gate: Mutex<()>,
}

impl RosterService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `trail_dir` - Directory for JSONL trail files. Pass `None` to disable
    ///   trail writing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the trail
    /// directory cannot be created.
    pub async fn new_local(
        db_path: &str,
        trail_dir: Option<PathBuf>,
    ) -> Result<Self, DatabaseError> {
        let db = RosterDb::open_local(db_path).await?;
        let trail = match trail_dir {
            Some(dir) => TrailWriter::new(dir)?,
            None => TrailWriter::disabled(),
        };
        Ok(Self::from_db(db, trail))
    }

    /// Build a service from loaded configuration.
    ///
    /// Relative storage paths resolve against `roster_dir`, which is created
    /// for file-backed databases.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the recruitment settings are invalid or the
    /// database cannot be opened.
    pub async fn from_config(config: &RosterConfig, roster_dir: &Path) -> Result<Self, DatabaseError> {
        let policy = config
            .recruitment
            .policy()
            .map_err(|e| DatabaseError::Other(e.into()))?;
        if !config.storage.is_in_memory() {
            std::fs::create_dir_all(roster_dir).map_err(|e| DatabaseError::Other(e.into()))?;
        }
        let db_path = config.storage.resolved_db_path(roster_dir);
        let service = Self::new_local(&db_path, config.storage.resolved_trail_dir(roster_dir))
            .await?
            .with_policy(policy)
            .with_default_waitlist(config.recruitment.default_waitlist);
        Ok(service)
    }

    /// Create from an existing `RosterDb` with the system clock, placeholder
    /// enrollments, and the default policy.
    #[must_use]
    pub fn from_db(db: RosterDb, trail: TrailWriter) -> Self {
        Self {
            db,
            trail,
            clock: Arc::new(SystemClock),
            source: Arc::new(PlaceholderEnrollments),
            policy: RecruitmentPolicy::default(),
            default_waitlist: DEFAULT_WAITLIST,
            locks: StudyLocks::new(),
            write_gate: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn EnrollmentSource>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: RecruitmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn with_default_waitlist(mut self, waitlist: u32) -> Self {
        self.default_waitlist = waitlist;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &RosterDb {
        &self.db
    }

    /// Access the trail writer.
    #[must_use]
    pub const fn trail(&self) -> &TrailWriter {
        &self.trail
    }

    #[must_use]
    pub const fn policy(&self) -> &RecruitmentPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn default_waitlist(&self) -> u32 {
        self.default_waitlist
    }

    /// Current time from the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn source(&self) -> &dyn EnrollmentSource {
        self.source.as_ref()
    }

    /// Hold the write gate for a read so it never observes another study's
    /// uncommitted transaction on the shared connection.
    pub(crate) async fn read_gate(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }

    /// Lock `study_id`, take the write gate, and open a transaction.
    pub(crate) async fn begin(
        &self,
        command: &'static str,
        study_id: &str,
    ) -> Result<WriteScope<'_>, DatabaseError> {
        let study = self.locks.acquire(study_id).await;
        let gate = self.write_gate.lock().await;
        let tx = self.db.conn().transaction().await?;
        Ok(WriteScope {
            tx,
            command,
            study_id: study_id.to_string(),
            ops: Vec::new(),
            _gate: gate,
            _study: study,
        })
    }

    /// Commit `scope` if `result` is `Ok`, after writing its trail operations.
    ///
    /// On error the transaction is rolled back and nothing is written to the
    /// trail.
    pub(crate) async fn finish<T>(
        &self,
        scope: WriteScope<'_>,
        result: Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let WriteScope {
            tx,
            command,
            study_id,
            ops,
            ..
        } = scope;

        let value = match result {
            Ok(value) => value,
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!(command, study_id = %study_id, %rollback, "rollback failed");
                }
                if err.as_core().is_some() {
                    tracing::warn!(command, study_id = %study_id, error = %err, "command rejected");
                }
                return Err(err);
            }
        };

        if let Err(err) = self.trail.append(&study_id, &ops) {
            tx.rollback().await?;
            return Err(err);
        }
        tx.commit().await?;
        Ok(value)
    }
}

/// An open command: the study lock, the write gate, and the transaction.
///
/// Guards are released when the scope is consumed by
/// [`RosterService::finish`].
pub(crate) struct WriteScope<'a> {
    tx: libsql::Transaction,
    command: &'static str,
    study_id: String,
    ops: Vec<TrailOperation>,
    _gate: MutexGuard<'a, ()>,
    _study: OwnedMutexGuard<()>,
}

impl WriteScope<'_> {
    /// Connection for statements inside the transaction.
    pub(crate) fn conn(&self) -> &libsql::Connection {
        &self.tx
    }

    /// Queue a trail operation for append at commit.
    ///
    /// `data` is the entity state after the mutation.
    pub(crate) fn record(
        &mut self,
        now: DateTime<Utc>,
        op: TrailOp,
        entity: EntityType,
        id: &str,
        data: &impl Serialize,
    ) -> Result<(), DatabaseError> {
        self.ops.push(TrailOperation {
            v: 1,
            ts: fmt_datetime(&now),
            study: self.study_id.clone(),
            command: self.command.to_string(),
            op,
            entity,
            id: id.to_string(),
            data: serde_json::to_value(data).map_err(|e| DatabaseError::Other(e.into()))?,
        });
        Ok(())
    }
}
