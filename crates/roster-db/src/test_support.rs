//! Shared test utilities for roster-db unit tests.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use roster_core::clock::ManualClock;

use crate::RosterDb;
use crate::service::RosterService;
use crate::trail::writer::TrailWriter;

/// Fixed start time for deterministic tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// In-memory service with trail disabled and a manual clock at [`t0`].
pub async fn test_service() -> (RosterService, Arc<ManualClock>) {
    let db = RosterDb::open_local(":memory:").await.unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let svc = RosterService::from_db(db, TrailWriter::disabled()).with_clock(clock.clone());
    (svc, clock)
}

/// In-memory service writing its trail under `trail_dir`.
pub async fn test_service_with_trail(trail_dir: PathBuf) -> (RosterService, Arc<ManualClock>) {
    let db = RosterDb::open_local(":memory:").await.unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let svc = RosterService::from_db(db, TrailWriter::new(trail_dir).unwrap())
        .with_clock(clock.clone());
    (svc, clock)
}
