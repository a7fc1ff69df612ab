//! Shipment tracking reducers.
//!
//! Cohort counters are always recounted from participant records rather than
//! incremented. Saving the same participant's code twice therefore counts
//! once, and a cohort can only complete when every participant actually
//! carries a tracking number.

use chrono::{DateTime, Utc};

use crate::carrier;
use crate::entities::{Cohort, ParticipantShipping, StudyRecruitmentState};
use crate::enums::{CohortStatus, EntityType, RecruitmentStatus, ShippingStatus};
use crate::errors::CoreError;

/// Result of a tracking-code entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingOutcome {
    pub participant: ParticipantShipping,
    pub cohort: Cohort,
    /// Recruitment status after the entry was applied.
    pub recruitment_status: RecruitmentStatus,
}

impl TrackingOutcome {
    #[must_use]
    pub fn cohort_completed(&self) -> bool {
        self.cohort.is_complete()
    }
}

/// Result of a delivery confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub participant: ParticipantShipping,
    /// The owning cohort, when its `delivered_count` was recounted.
    pub cohort: Option<Cohort>,
}

/// Record a tracking code on a single participant.
///
/// The stored number is the trimmed input; carrier detection runs on the
/// normalised form. A code the classifier does not recognise is still saved.
///
/// # Errors
///
/// `Validation` for a blank code, `InvalidTransition` for a delivered
/// participant.
pub fn record_tracking(
    participant: &mut ParticipantShipping,
    tracking_number: &str,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    let code = tracking_number.trim();
    if code.is_empty() {
        return Err(CoreError::Validation(
            "tracking number cannot be empty".to_string(),
        ));
    }
    if participant.status == ShippingStatus::Delivered {
        return Err(CoreError::invalid_transition(
            EntityType::Participant,
            participant.participant_id.clone(),
            participant.status,
            "enter_tracking_code",
        ));
    }

    participant.tracking_number = Some(code.to_string());
    participant.tracking_carrier = carrier::detect_carrier(code);
    participant.status = ShippingStatus::Shipped;
    participant.shipped_at = Some(now);
    Ok(())
}

/// Mark a shipped participant as delivered.
///
/// # Errors
///
/// `InvalidTransition` unless the participant is `shipped`.
pub fn record_delivery(
    participant: &mut ParticipantShipping,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    if !participant.status.can_transition_to(ShippingStatus::Delivered) {
        return Err(CoreError::invalid_transition(
            EntityType::Participant,
            participant.participant_id.clone(),
            participant.status,
            "mark_delivered",
        ));
    }
    participant.status = ShippingStatus::Delivered;
    participant.delivered_at = Some(now);
    Ok(())
}

/// Recount a cohort's fulfillment fields from its participants.
///
/// Records outside the cohort's roster are ignored. Sets `complete` when
/// every participant has a code and `shipping` once any has one. The status
/// move must be allowed by [`CohortStatus::allowed_next_states`].
///
/// # Errors
///
/// `InvalidTransition` if the cohort is already complete or the move is not
/// in the cohort transition table; the cohort is left unchanged.
pub fn tally<'a>(
    cohort: &mut Cohort,
    participants: impl IntoIterator<Item = &'a ParticipantShipping>,
) -> Result<(), CoreError> {
    if cohort.is_complete() {
        return Err(CoreError::invalid_transition(
            EntityType::Cohort,
            cohort.id.clone(),
            cohort.status,
            "tally",
        ));
    }

    let mut tracked = 0_u32;
    let mut delivered = 0_u32;
    for participant in participants {
        if participant.cohort_id != cohort.id || !cohort.contains(&participant.participant_id) {
            continue;
        }
        if participant.has_tracking() {
            tracked += 1;
        }
        if participant.status == ShippingStatus::Delivered {
            delivered += 1;
        }
    }

    let tracked = tracked.min(cohort.size());
    let all_tracking_entered = tracked == cohort.size();
    let next = if all_tracking_entered {
        CohortStatus::Complete
    } else if tracked > 0 {
        CohortStatus::Shipping
    } else {
        cohort.status
    };
    if next != cohort.status && !cohort.status.can_transition_to(next) {
        return Err(CoreError::invalid_transition(
            EntityType::Cohort,
            cohort.id.clone(),
            cohort.status,
            "tally",
        ));
    }

    cohort.tracking_codes_entered = tracked;
    cohort.all_tracking_entered = all_tracking_entered;
    cohort.delivered_count = delivered;
    cohort.status = next;
    Ok(())
}

/// Enter a tracking code for `participant` and advance the study.
///
/// `roster` holds the stored records of the current cohort's participants;
/// the updated `participant` takes precedence over its stale copy there.
///
/// # Errors
///
/// - `NotFound` if the participant belongs to another study.
/// - `InvalidTransition` if the study has no cohort in fulfillment, the
///   participant is in an earlier (completed) cohort, or was delivered.
/// - `Validation` for a blank code.
///
/// On error neither `state` nor any record is changed.
pub fn enter_tracking_code(
    state: &mut StudyRecruitmentState,
    participant: &ParticipantShipping,
    roster: &[ParticipantShipping],
    tracking_number: &str,
    now: DateTime<Utc>,
) -> Result<TrackingOutcome, CoreError> {
    const OPERATION: &str = "enter_tracking_code";

    if participant.study_id != state.study_id {
        return Err(CoreError::not_found(
            EntityType::Participant,
            participant.participant_id.clone(),
        ));
    }
    let Some(current) = state.current_cohort() else {
        return Err(CoreError::invalid_transition(
            EntityType::Recruitment,
            state.study_id.clone(),
            state.status,
            OPERATION,
        ));
    };
    if participant.cohort_id != current.id {
        let from = state
            .cohorts
            .iter()
            .find(|c| c.id == participant.cohort_id)
            .map_or(CohortStatus::Complete, |c| c.status);
        return Err(CoreError::invalid_transition(
            EntityType::Cohort,
            participant.cohort_id.clone(),
            from,
            OPERATION,
        ));
    }

    let mut cohort = current.clone();
    let mut updated = participant.clone();
    record_tracking(&mut updated, tracking_number, now)?;

    let view = roster
        .iter()
        .filter(|p| p.participant_id != updated.participant_id)
        .chain(std::iter::once(&updated));
    tally(&mut cohort, view)?;

    state.apply_cohort_progress(cohort.clone(), now)?;

    Ok(TrackingOutcome {
        participant: updated,
        cohort,
        recruitment_status: state.status,
    })
}

/// Confirm delivery for `participant`.
///
/// The owning cohort's `delivered_count` is recounted only while that cohort
/// is still the current one; completed cohorts are never rewritten. Live
/// delivery numbers for any cohort come from `CohortProgress`.
///
/// # Errors
///
/// `NotFound` if the participant belongs to another study,
/// `InvalidTransition` unless the participant is `shipped`.
pub fn confirm_delivery(
    state: &mut StudyRecruitmentState,
    participant: &ParticipantShipping,
    roster: &[ParticipantShipping],
    now: DateTime<Utc>,
) -> Result<DeliveryOutcome, CoreError> {
    if participant.study_id != state.study_id {
        return Err(CoreError::not_found(
            EntityType::Participant,
            participant.participant_id.clone(),
        ));
    }

    let mut updated = participant.clone();
    record_delivery(&mut updated, now)?;

    let cohort = match state.current_cohort() {
        Some(current) if current.id == updated.cohort_id => {
            let mut cohort = current.clone();
            let view = roster
                .iter()
                .filter(|p| p.participant_id != updated.participant_id)
                .chain(std::iter::once(&updated));
            tally(&mut cohort, view)?;
            state.apply_cohort_progress(cohort.clone(), now)?;
            Some(cohort)
        }
        _ => None,
    };

    Ok(DeliveryOutcome {
        participant: updated,
        cohort,
    })
}
