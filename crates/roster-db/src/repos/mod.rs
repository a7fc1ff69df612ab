//! Table access for recruitment states, cohorts, and participants.
//!
//! Functions take a `libsql::Connection` so that commands can pass their
//! open transaction; read-only queries for callers live on `RosterService`.

pub mod cohort;
pub mod participant;
pub mod recruitment;
