//! Response types returned as JSON by `roster` commands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Cohort, ParticipantShipping, StudyRecruitmentState};
use crate::enums::ShippingStatus;

/// Fulfillment pipeline for one cohort: enrolled → addresses → shipped → delivered.
///
/// Derived from participant records on every read, so it stays current for
/// cohorts whose stored snapshot is frozen.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CohortProgress {
    pub enrolled: u32,
    pub addresses: u32,
    pub shipped: u32,
    pub delivered: u32,
}

impl CohortProgress {
    #[must_use]
    pub fn from_participants<'a>(
        participants: impl IntoIterator<Item = &'a ParticipantShipping>,
    ) -> Self {
        participants
            .into_iter()
            .fold(Self::default(), |mut progress, participant| {
                progress.enrolled += 1;
                if participant.address.is_some() {
                    progress.addresses += 1;
                }
                if participant.has_tracking() {
                    progress.shipped += 1;
                }
                if participant.status == ShippingStatus::Delivered {
                    progress.delivered += 1;
                }
                progress
            })
    }
}

/// Response from `roster enroll`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EnrollResponse {
    pub accepted: u32,
    pub recruitment: StudyRecruitmentState,
}

/// Response from `roster track`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TrackResponse {
    pub participant: ParticipantShipping,
    pub cohort: Cohort,
    pub recruitment: StudyRecruitmentState,
}

/// Response from `roster progress`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CohortProgressResponse {
    pub cohort: Cohort,
    pub progress: CohortProgress,
}

/// A study whose advisory window deadline has passed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DueWindow {
    pub study_id: String,
    pub ends_at: chrono::DateTime<chrono::Utc>,
    pub enrolled: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ShippingAddress;
    use chrono::Utc;

    fn participant(index: usize, status: ShippingStatus, with_address: bool) -> ParticipantShipping {
        ParticipantShipping {
            participant_id: format!("s1-cohort-1-p{index}"),
            study_id: "s1".into(),
            cohort_id: "s1-cohort-1".into(),
            status,
            display_name: "Sam K.".into(),
            initials: "SK".into(),
            address: with_address.then(|| ShippingAddress {
                full_name: "Sam K.".into(),
                street1: "10 Pine St".into(),
                street2: None,
                city: "Seattle".into(),
                state: "WA".into(),
                zip_code: "98101".into(),
            }),
            tracking_number: status
                .requires_tracking()
                .then(|| "1234567890".to_string()),
            tracking_carrier: None,
            enrolled_at: Utc::now(),
            shipped_at: None,
            delivered_at: None,
        }
    }

    #[test]
    fn progress_counts_each_stage() {
        let participants = [
            participant(0, ShippingStatus::ReadyToShip, false),
            participant(1, ShippingStatus::ReadyToShip, true),
            participant(2, ShippingStatus::Shipped, true),
            participant(3, ShippingStatus::Delivered, true),
        ];
        let progress = CohortProgress::from_participants(&participants);
        assert_eq!(
            progress,
            CohortProgress {
                enrolled: 4,
                addresses: 3,
                shipped: 2,
                delivered: 1,
            }
        );
    }
}
