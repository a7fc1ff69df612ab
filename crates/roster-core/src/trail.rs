//! JSONL trail operation envelope.
//!
//! Every committed mutation is recorded as a `TrailOperation` in per-study
//! `{trail_dir}/{study_id}.jsonl` files, giving an append-only history of
//! each study's commands next to the keyed tables.
//!
//! The `v` field supports schema versioning: records without a `v` field
//! deserialize with `v == 1` via `#[serde(default)]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityType, TrailOp};

/// Default trail version for records written without one.
const fn default_trail_version() -> u32 {
    1
}

/// A single operation recorded in the JSONL trail.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TrailOperation {
    /// Schema version. Defaults to 1.
    #[serde(default = "default_trail_version")]
    pub v: u32,

    /// ISO 8601 timestamp of the operation.
    pub ts: String,

    /// Study the operation belongs to. Also names the trail file.
    pub study: String,

    /// Command that produced the operation, e.g. `close_window`.
    pub command: String,

    /// What kind of mutation this represents.
    pub op: TrailOp,

    /// Which entity type was affected.
    pub entity: EntityType,

    /// ID of the affected entity.
    pub id: String,

    /// Operation payload: the entity state after the mutation.
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_op_roundtrip() {
        let op = TrailOperation {
            v: 1,
            ts: "2026-03-01T09:00:00Z".to_string(),
            study: "s1".to_string(),
            command: "go_live".to_string(),
            op: TrailOp::Transition,
            entity: EntityType::Recruitment,
            id: "s1".to_string(),
            data: serde_json::json!({"status": "window_open"}),
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: TrailOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn missing_version_defaults_to_one() {
        let json = r#"{"ts":"2026-03-01T09:00:00Z","study":"s1","command":"init","op":"create","entity":"recruitment","id":"s1","data":null}"#;
        let op: TrailOperation = serde_json::from_str(json).unwrap();
        assert_eq!(op.v, 1);
        assert_eq!(op.entity, EntityType::Recruitment);
    }
}
