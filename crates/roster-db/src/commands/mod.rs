//! Mutating commands on `RosterService`.
//!
//! Each public command opens a [`WriteScope`](crate::service::WriteScope),
//! runs its body against the transaction, and hands the result to
//! `RosterService::finish` to commit or roll back.

pub mod recruitment;
pub mod shipping;

use chrono::{DateTime, Utc};
use roster_core::entities::StudyRecruitmentState;
use roster_core::enums::{EntityType, RecruitmentStatus, TrailOp};

use crate::error::DatabaseError;
use crate::service::WriteScope;

/// Trail the recruitment state as a transition or a plain update.
fn record_recruitment(
    scope: &mut WriteScope<'_>,
    now: DateTime<Utc>,
    from: RecruitmentStatus,
    state: &StudyRecruitmentState,
) -> Result<(), DatabaseError> {
    let op = if from == state.status {
        TrailOp::Update
    } else {
        tracing::debug!(
            study_id = %state.study_id,
            %from,
            to = %state.status,
            "recruitment transition"
        );
        TrailOp::Transition
    };
    scope.record(now, op, EntityType::Recruitment, &state.study_id, state)
}
