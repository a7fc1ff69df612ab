use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::CohortStatus;

/// The batch of participants enrolled during one closed recruitment window.
///
/// `participant_ids` is fixed at creation. Once `status` is `complete` the
/// fulfillment fields never change again.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Cohort {
    pub id: String,
    pub study_id: String,
    pub cohort_number: u32,
    pub status: CohortStatus,
    pub window_opened_at: DateTime<Utc>,
    pub window_closed_at: DateTime<Utc>,
    pub participant_ids: Vec<String>,
    pub addresses_collected: u32,
    pub tracking_codes_entered: u32,
    pub all_tracking_entered: bool,
    pub delivered_count: u32,
}

impl Cohort {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn size(&self) -> u32 {
        self.participant_ids.len() as u32
    }

    #[must_use]
    pub fn contains(&self, participant_id: &str) -> bool {
        self.participant_ids.iter().any(|id| id == participant_id)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == CohortStatus::Complete
    }
}
