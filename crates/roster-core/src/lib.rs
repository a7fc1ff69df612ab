//! # roster-core
//!
//! Core types and pure state-machine logic for Roster cohort recruitment.
//!
//! This crate provides the foundational types shared across all Roster crates:
//! - Entity structs for recruitment state, cohorts, and participant shipping
//! - Status enums with state machine transitions
//! - ID formatting helpers
//! - Cross-cutting error types
//! - The recruitment controller, cohort factory, shipment tally, and
//!   conversion estimator as synchronous reducers over in-memory state
//! - Carrier classification for tracking codes
//! - Trail operation envelope for JSONL persistence
//!
//! Nothing here performs I/O. Persistence and per-study serialization live
//! in `roster-db`.

pub mod carrier;
pub mod clock;
pub mod controller;
pub mod conversion;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod factory;
pub mod ids;
pub mod responses;
pub mod tracking;
pub mod trail;
