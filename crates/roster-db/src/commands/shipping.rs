//! Shipping commands: tracking-code entry and delivery confirmation.

use roster_core::entities::ParticipantShipping;
use roster_core::enums::{EntityType, TrailOp};
use roster_core::errors::CoreError;
use roster_core::responses::TrackResponse;
use roster_core::tracking;

use super::record_recruitment;
use crate::error::DatabaseError;
use crate::repos::{participant, recruitment};
use crate::service::{RosterService, WriteScope};

async fn load_participant(
    conn: &libsql::Connection,
    participant_id: &str,
) -> Result<ParticipantShipping, DatabaseError> {
    participant::get(conn, participant_id)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityType::Participant, participant_id).into())
}

impl RosterService {
    /// Save a participant's tracking code and advance their cohort.
    ///
    /// When the last code of the current cohort is entered the cohort
    /// completes and the study moves to `ready_to_open`, or to `complete` if
    /// the target has been reached.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown study, or a participant that is unknown or
    ///   belongs to another study.
    /// - `InvalidTransition` if the study has no cohort in fulfillment, the
    ///   participant is in an earlier cohort, or was already delivered.
    /// - `Validation` for a blank code.
    pub async fn enter_tracking_code(
        &self,
        study_id: &str,
        participant_id: &str,
        tracking_number: &str,
    ) -> Result<TrackResponse, DatabaseError> {
        let mut scope = self.begin("enter_tracking_code", study_id).await?;
        let result = self
            .enter_tracking_in(&mut scope, study_id, participant_id, tracking_number)
            .await;
        self.finish(scope, result).await
    }

    async fn enter_tracking_in(
        &self,
        scope: &mut WriteScope<'_>,
        study_id: &str,
        participant_id: &str,
        tracking_number: &str,
    ) -> Result<TrackResponse, DatabaseError> {
        let now = self.now();
        let mut state = recruitment::load(scope.conn(), study_id).await?;
        let stored = load_participant(scope.conn(), participant_id).await?;
        let roster = participant::list_by_cohort(scope.conn(), &stored.cohort_id).await?;
        let from = state.status;

        let outcome =
            tracking::enter_tracking_code(&mut state, &stored, &roster, tracking_number, now)?;

        participant::update(scope.conn(), &outcome.participant).await?;
        recruitment::save(scope.conn(), &state).await?;
        scope.record(
            now,
            TrailOp::Update,
            EntityType::Participant,
            participant_id,
            &outcome.participant,
        )?;
        scope.record(
            now,
            TrailOp::Update,
            EntityType::Cohort,
            &outcome.cohort.id,
            &outcome.cohort,
        )?;
        record_recruitment(scope, now, from, &state)?;

        tracing::debug!(
            study_id,
            participant_id,
            carrier = ?outcome.participant.tracking_carrier,
            entered = outcome.cohort.tracking_codes_entered,
            size = outcome.cohort.size(),
            "tracking code saved"
        );
        if outcome.cohort_completed() {
            tracing::info!(
                study_id,
                cohort_id = %outcome.cohort.id,
                status = %state.status,
                "cohort fulfillment complete"
            );
        }

        Ok(TrackResponse {
            participant: outcome.participant,
            cohort: outcome.cohort,
            recruitment: state,
        })
    }

    /// Confirm that a shipped participant received their kit.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown study or participant, `InvalidTransition`
    /// unless the participant is `shipped`.
    pub async fn mark_delivered(
        &self,
        study_id: &str,
        participant_id: &str,
    ) -> Result<ParticipantShipping, DatabaseError> {
        let mut scope = self.begin("mark_delivered", study_id).await?;
        let result = self
            .mark_delivered_in(&mut scope, study_id, participant_id)
            .await;
        self.finish(scope, result).await
    }

    async fn mark_delivered_in(
        &self,
        scope: &mut WriteScope<'_>,
        study_id: &str,
        participant_id: &str,
    ) -> Result<ParticipantShipping, DatabaseError> {
        let now = self.now();
        let mut state = recruitment::load(scope.conn(), study_id).await?;
        let stored = load_participant(scope.conn(), participant_id).await?;
        let roster = participant::list_by_cohort(scope.conn(), &stored.cohort_id).await?;
        let from = state.status;

        let outcome = tracking::confirm_delivery(&mut state, &stored, &roster, now)?;

        participant::update(scope.conn(), &outcome.participant).await?;
        scope.record(
            now,
            TrailOp::Update,
            EntityType::Participant,
            participant_id,
            &outcome.participant,
        )?;
        if let Some(cohort) = &outcome.cohort {
            recruitment::save(scope.conn(), &state).await?;
            scope.record(now, TrailOp::Update, EntityType::Cohort, &cohort.id, cohort)?;
            record_recruitment(scope, now, from, &state)?;
        }
        tracing::debug!(study_id, participant_id, "delivery confirmed");
        Ok(outcome.participant)
    }
}
