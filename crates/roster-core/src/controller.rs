//! Recruitment state machine.
//!
//! Every command is a synchronous reducer on [`StudyRecruitmentState`]. A
//! command either applies a transition from the table on
//! [`RecruitmentStatus::allowed_next_states`] or returns
//! `CoreError::InvalidTransition` without touching the state.
//!
//! Window deadlines are advisory. Nothing here closes a window when
//! `current_window_ends_at` passes; an outside scheduler issues `close_window`.

use chrono::{DateTime, Duration, Utc};

use crate::conversion::ConversionEstimator;
use crate::entities::{Cohort, StudyRecruitmentState, WindowRecord};
use crate::enums::{EntityType, RecruitmentStatus};
use crate::errors::CoreError;
use crate::factory::{CohortBatch, CohortFactory};

/// Default length of a recruitment window.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Tunables shared by every study.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecruitmentPolicy {
    pub window_duration: Duration,
    pub estimator: ConversionEstimator,
}

impl Default for RecruitmentPolicy {
    fn default() -> Self {
        Self {
            window_duration: Duration::hours(DEFAULT_WINDOW_HOURS),
            estimator: ConversionEstimator::default(),
        }
    }
}

/// Result of `open_window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOpening {
    Opened,
    /// The study was already full; it moved to `complete` instead.
    StudyFull,
}

/// Result of `close_window`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowClosing {
    /// Nobody enrolled; the study is ready to open another window.
    Empty,
    /// A cohort was created and is now the current cohort.
    Cohort(CohortBatch),
}

impl StudyRecruitmentState {
    /// Fresh state for a study that has not gone live yet.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for an empty study ID or a zero target.
    pub fn new(
        study_id: &str,
        target_participants: u32,
        waitlist_count: u32,
        policy: &RecruitmentPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if study_id.trim().is_empty() {
            return Err(CoreError::Validation("study id cannot be empty".to_string()));
        }
        if target_participants == 0 {
            return Err(CoreError::Validation(
                "target participants must be positive".to_string(),
            ));
        }

        Ok(Self {
            study_id: study_id.to_string(),
            status: RecruitmentStatus::WaitlistOnly,
            total_enrolled: 0,
            target_participants,
            waitlist_count,
            current_window_ends_at: None,
            current_window_enrolled: 0,
            current_cohort_id: None,
            cohorts: Vec::new(),
            window_history: Vec::new(),
            conversion_rate: policy.estimator.fallback(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Open the first recruitment window.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the study is `waitlist_only`.
    pub fn go_live(
        &mut self,
        policy: &RecruitmentPolicy,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.require(RecruitmentStatus::WaitlistOnly, "go_live")?;
        self.start_window(policy, now);
        Ok(())
    }

    /// Open the next recruitment window after a cohort finished fulfillment.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the study is `ready_to_open`.
    pub fn open_window(
        &mut self,
        policy: &RecruitmentPolicy,
        now: DateTime<Utc>,
    ) -> Result<WindowOpening, CoreError> {
        self.require(RecruitmentStatus::ReadyToOpen, "open_window")?;

        if self.is_full() {
            self.transition(RecruitmentStatus::Complete, now);
            return Ok(WindowOpening::StudyFull);
        }

        self.start_window(policy, now);
        Ok(WindowOpening::Opened)
    }

    /// Close the open window, forming a cohort from its enrollees.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the study is `window_open`; any error from
    /// the factory is returned with the state left untouched.
    pub fn close_window(
        &mut self,
        policy: &RecruitmentPolicy,
        factory: &CohortFactory<'_>,
        now: DateTime<Utc>,
    ) -> Result<WindowClosing, CoreError> {
        self.require(RecruitmentStatus::WindowOpen, "close_window")?;

        let enrolled = self.current_window_enrolled;
        if enrolled == 0 {
            self.finalize_window(0, policy, now);
            self.current_window_ends_at = None;
            self.transition(RecruitmentStatus::ReadyToOpen, now);
            return Ok(WindowClosing::Empty);
        }

        let opened_at = self
            .open_window_record()
            .map_or(now, |window| window.opened_at);
        let batch = factory.create_cohort(
            &self.study_id,
            self.next_cohort_number(),
            enrolled,
            opened_at,
            now,
        )?;

        self.cohorts.push(batch.cohort.clone());
        self.current_cohort_id = Some(batch.cohort.id.clone());
        self.total_enrolled += enrolled;
        self.finalize_window(enrolled, policy, now);
        self.current_window_enrolled = 0;
        self.current_window_ends_at = None;
        self.transition(RecruitmentStatus::WindowClosed, now);

        Ok(WindowClosing::Cohort(batch))
    }

    /// Enroll up to `count` waitlisted participants into the open window.
    ///
    /// Enrollment is clamped to the remaining capacity so the study never
    /// overfills. Returns how many were accepted.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the study is `window_open`.
    pub fn enroll(&mut self, count: u32, now: DateTime<Utc>) -> Result<u32, CoreError> {
        self.require(RecruitmentStatus::WindowOpen, "enroll")?;

        let accepted = count.min(self.remaining_capacity());
        self.current_window_enrolled += accepted;
        self.waitlist_count = self.waitlist_count.saturating_sub(accepted);
        self.updated_at = now;
        Ok(accepted)
    }

    /// Add `count` people to the waitlist. Accepted in every status.
    pub fn grow_waitlist(&mut self, count: u32, now: DateTime<Utc>) {
        self.waitlist_count = self.waitlist_count.saturating_add(count);
        self.updated_at = now;
    }

    /// Fold an updated snapshot of the current cohort back into the state.
    ///
    /// When the cohort has completed fulfillment the study either finishes
    /// (target reached) or becomes ready for its next window. The cohort
    /// stays in `cohorts` either way.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if `cohort` is not the current cohort.
    pub fn apply_cohort_progress(
        &mut self,
        cohort: Cohort,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if self.current_cohort_id.as_deref() != Some(cohort.id.as_str()) {
            return Err(CoreError::invalid_transition(
                EntityType::Cohort,
                cohort.id,
                cohort.status,
                "apply_cohort_progress",
            ));
        }

        let completed = cohort.is_complete();
        if let Some(slot) = self.cohorts.iter_mut().find(|c| c.id == cohort.id) {
            *slot = cohort;
        }
        self.updated_at = now;

        if completed {
            self.current_cohort_id = None;
            self.current_window_ends_at = None;
            let next = if self.is_full() {
                RecruitmentStatus::Complete
            } else {
                RecruitmentStatus::ReadyToOpen
            };
            self.transition(next, now);
        }
        Ok(())
    }

    /// The number the next cohort of this study must carry.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_cohort_number(&self) -> u32 {
        self.cohorts.len() as u32 + 1
    }

    fn require(&self, expected: RecruitmentStatus, operation: &'static str) -> Result<(), CoreError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(CoreError::invalid_transition(
                EntityType::Recruitment,
                self.study_id.clone(),
                self.status,
                operation,
            ))
        }
    }

    fn start_window(&mut self, policy: &RecruitmentPolicy, now: DateTime<Utc>) {
        self.current_window_ends_at = Some(now + policy.window_duration);
        self.current_window_enrolled = 0;
        self.window_history.push(WindowRecord {
            waitlist_at_open: self.waitlist_count,
            enrolled: 0,
            opened_at: now,
            closed_at: None,
        });
        self.transition(RecruitmentStatus::WindowOpen, now);
    }

    fn finalize_window(&mut self, enrolled: u32, policy: &RecruitmentPolicy, now: DateTime<Utc>) {
        if let Some(window) = self.window_history.last_mut() {
            window.enrolled = enrolled;
            window.closed_at = Some(now);
        }
        self.conversion_rate = policy.estimator.estimate(&self.window_history);
    }

    fn transition(&mut self, to: RecruitmentStatus, now: DateTime<Utc>) {
        debug_assert!(
            self.status.can_transition_to(to),
            "{} -> {to} is not in the transition table",
            self.status
        );
        self.status = to;
        self.updated_at = now;
    }
}
