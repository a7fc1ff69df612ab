use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Cohort;
use crate::enums::RecruitmentStatus;

/// One recruitment window as seen by the conversion estimator.
///
/// `enrolled` stays 0 while the window is open and is finalized on close.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WindowRecord {
    pub waitlist_at_open: u32,
    pub enrolled: u32,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl WindowRecord {
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.closed_at.is_some()
    }
}

/// Per-study recruitment state. One per study, never deleted.
///
/// `current_cohort_id` references an entry of `cohorts` and is set exactly
/// while `status` is `window_closed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StudyRecruitmentState {
    pub study_id: String,
    pub status: RecruitmentStatus,
    pub total_enrolled: u32,
    pub target_participants: u32,
    pub waitlist_count: u32,
    pub current_window_ends_at: Option<DateTime<Utc>>,
    pub current_window_enrolled: u32,
    pub current_cohort_id: Option<String>,
    pub cohorts: Vec<Cohort>,
    pub window_history: Vec<WindowRecord>,
    pub conversion_rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudyRecruitmentState {
    /// The cohort currently in fulfillment, if any.
    #[must_use]
    pub fn current_cohort(&self) -> Option<&Cohort> {
        let id = self.current_cohort_id.as_deref()?;
        self.cohorts.iter().find(|c| c.id == id)
    }

    /// Seats still available in the current window.
    #[must_use]
    pub const fn remaining_capacity(&self) -> u32 {
        self.target_participants
            .saturating_sub(self.total_enrolled)
            .saturating_sub(self.current_window_enrolled)
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.total_enrolled >= self.target_participants
    }

    /// The open (not yet finalized) window, if one exists.
    #[must_use]
    pub fn open_window_record(&self) -> Option<&WindowRecord> {
        self.window_history.last().filter(|w| !w.is_finalized())
    }
}
