//! Recruitment commands: initialize, go live, open/close windows, enroll,
//! and waitlist growth.

use roster_core::controller::WindowClosing;
use roster_core::entities::StudyRecruitmentState;
use roster_core::enums::{EntityType, TrailOp};
use roster_core::errors::CoreError;
use roster_core::factory::CohortFactory;
use roster_core::responses::EnrollResponse;

use super::record_recruitment;
use crate::error::DatabaseError;
use crate::repos::{participant, recruitment};
use crate::service::{RosterService, WriteScope};

impl RosterService {
    /// Create a study's recruitment state in `waitlist_only`.
    ///
    /// Idempotent: an existing study is returned unchanged. `waitlist_count`
    /// falls back to the configured default.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank study ID or a zero target.
    pub async fn initialize_study(
        &self,
        study_id: &str,
        target_participants: u32,
        waitlist_count: Option<u32>,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        let mut scope = self.begin("initialize_study", study_id).await?;
        let result = self
            .initialize_in(&mut scope, study_id, target_participants, waitlist_count)
            .await;
        self.finish(scope, result).await
    }

    async fn initialize_in(
        &self,
        scope: &mut WriteScope<'_>,
        study_id: &str,
        target_participants: u32,
        waitlist_count: Option<u32>,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        if let Some(existing) = recruitment::find(scope.conn(), study_id).await? {
            tracing::debug!(study_id, status = %existing.status, "study already initialized");
            return Ok(existing);
        }

        let now = self.now();
        let state = StudyRecruitmentState::new(
            study_id,
            target_participants,
            waitlist_count.unwrap_or_else(|| self.default_waitlist()),
            self.policy(),
            now,
        )?;
        recruitment::save(scope.conn(), &state).await?;
        scope.record(now, TrailOp::Create, EntityType::Recruitment, study_id, &state)?;
        tracing::info!(study_id, target_participants, "study initialized");
        Ok(state)
    }

    /// Open the first recruitment window.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown study, `InvalidTransition` unless the study
    /// is `waitlist_only`.
    pub async fn go_live(&self, study_id: &str) -> Result<StudyRecruitmentState, DatabaseError> {
        let mut scope = self.begin("go_live", study_id).await?;
        let result = self.go_live_in(&mut scope, study_id).await;
        self.finish(scope, result).await
    }

    async fn go_live_in(
        &self,
        scope: &mut WriteScope<'_>,
        study_id: &str,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        let now = self.now();
        let mut state = recruitment::load(scope.conn(), study_id).await?;
        let from = state.status;
        state.go_live(self.policy(), now)?;
        recruitment::save(scope.conn(), &state).await?;
        record_recruitment(scope, now, from, &state)?;
        Ok(state)
    }

    /// Open the next window, or complete the study if it is already full.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown study, `InvalidTransition` unless the study
    /// is `ready_to_open`.
    pub async fn open_window(
        &self,
        study_id: &str,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        let mut scope = self.begin("open_window", study_id).await?;
        let result = self.open_window_in(&mut scope, study_id).await;
        self.finish(scope, result).await
    }

    async fn open_window_in(
        &self,
        scope: &mut WriteScope<'_>,
        study_id: &str,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        let now = self.now();
        let mut state = recruitment::load(scope.conn(), study_id).await?;
        let from = state.status;
        let opening = state.open_window(self.policy(), now)?;
        recruitment::save(scope.conn(), &state).await?;
        record_recruitment(scope, now, from, &state)?;
        tracing::debug!(study_id, ?opening, "open_window applied");
        Ok(state)
    }

    /// Close the open window. Enrollees become the next cohort.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown study, `InvalidTransition` unless the study
    /// is `window_open`, or any error from the enrollment source.
    pub async fn close_window(
        &self,
        study_id: &str,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        let mut scope = self.begin("close_window", study_id).await?;
        let result = self.close_window_in(&mut scope, study_id).await;
        self.finish(scope, result).await
    }

    async fn close_window_in(
        &self,
        scope: &mut WriteScope<'_>,
        study_id: &str,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        let now = self.now();
        let mut state = recruitment::load(scope.conn(), study_id).await?;
        let from = state.status;
        let factory = CohortFactory::new(self.source());
        let closing = state.close_window(self.policy(), &factory, now)?;
        recruitment::save(scope.conn(), &state).await?;
        record_recruitment(scope, now, from, &state)?;

        match closing {
            WindowClosing::Cohort(batch) => {
                participant::insert_batch(scope.conn(), &batch.participants).await?;
                scope.record(
                    now,
                    TrailOp::Create,
                    EntityType::Cohort,
                    &batch.cohort.id,
                    &batch.cohort,
                )?;
                for p in &batch.participants {
                    scope.record(
                        now,
                        TrailOp::Create,
                        EntityType::Participant,
                        &p.participant_id,
                        p,
                    )?;
                }
                tracing::info!(
                    study_id,
                    cohort_id = %batch.cohort.id,
                    size = batch.participants.len(),
                    conversion_rate = state.conversion_rate,
                    "cohort created"
                );
            }
            WindowClosing::Empty => {
                tracing::debug!(study_id, "window closed with no enrollments");
            }
        }
        Ok(state)
    }

    /// Enroll up to `count` people from the waitlist into the open window.
    ///
    /// The accepted count is clamped so the study never exceeds its target.
    ///
    /// # Errors
    ///
    /// `Validation` for a zero count, `NotFound` for an unknown study,
    /// `InvalidTransition` unless the study is `window_open`.
    pub async fn enroll(&self, study_id: &str, count: u32) -> Result<EnrollResponse, DatabaseError> {
        let mut scope = self.begin("enroll", study_id).await?;
        let result = self.enroll_in(&mut scope, study_id, count).await;
        self.finish(scope, result).await
    }

    async fn enroll_in(
        &self,
        scope: &mut WriteScope<'_>,
        study_id: &str,
        count: u32,
    ) -> Result<EnrollResponse, DatabaseError> {
        if count == 0 {
            return Err(CoreError::Validation("enrollment count must be positive".into()).into());
        }
        let now = self.now();
        let mut state = recruitment::load(scope.conn(), study_id).await?;
        let from = state.status;
        let accepted = state.enroll(count, now)?;
        recruitment::save(scope.conn(), &state).await?;
        record_recruitment(scope, now, from, &state)?;
        if accepted < count {
            tracing::debug!(study_id, requested = count, accepted, "enrollment clamped to capacity");
        }
        Ok(EnrollResponse {
            accepted,
            recruitment: state,
        })
    }

    /// Add `count` people to a study's waitlist.
    ///
    /// # Errors
    ///
    /// `Validation` for a zero count, `NotFound` for an unknown study.
    pub async fn grow_waitlist(
        &self,
        study_id: &str,
        count: u32,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        let mut scope = self.begin("grow_waitlist", study_id).await?;
        let result = self.grow_waitlist_in(&mut scope, study_id, count).await;
        self.finish(scope, result).await
    }

    async fn grow_waitlist_in(
        &self,
        scope: &mut WriteScope<'_>,
        study_id: &str,
        count: u32,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        if count == 0 {
            return Err(CoreError::Validation("waitlist growth must be positive".into()).into());
        }
        let now = self.now();
        let mut state = recruitment::load(scope.conn(), study_id).await?;
        let from = state.status;
        state.grow_waitlist(count, now);
        recruitment::save(scope.conn(), &state).await?;
        record_recruitment(scope, now, from, &state)?;
        Ok(state)
    }
}
