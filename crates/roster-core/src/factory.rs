//! Cohort construction on window close.
//!
//! The factory turns "N people enrolled in window k" into a `Cohort` plus N
//! `ParticipantShipping` records. Who those N people are comes from an
//! [`EnrollmentSource`]; production wires a real enrollment/address query,
//! the CLI and tests use [`PlaceholderEnrollments`].

use std::fmt;

use chrono::{DateTime, Utc};

use crate::entities::{Cohort, ParticipantShipping, ShippingAddress};
use crate::enums::{CohortStatus, ShippingStatus};
use crate::errors::CoreError;
use crate::ids;

/// A participant as supplied by the enrollment source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollee {
    pub display_name: String,
    pub address: Option<ShippingAddress>,
    /// When the participant enrolled. `None` means "at window close".
    pub enrolled_at: Option<DateTime<Utc>>,
}

/// Supplies the people behind an enrollment count.
pub trait EnrollmentSource: Send + Sync + fmt::Debug {
    /// Return exactly `count` enrollees for cohort `cohort_number` of `study_id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` if the backing data cannot be read.
    fn enrollees(
        &self,
        study_id: &str,
        cohort_number: u32,
        count: u32,
    ) -> Result<Vec<Enrollee>, CoreError>;
}

/// Synthesizes numbered placeholder enrollees with a placeholder address.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEnrollments;

impl EnrollmentSource for PlaceholderEnrollments {
    fn enrollees(
        &self,
        _study_id: &str,
        cohort_number: u32,
        count: u32,
    ) -> Result<Vec<Enrollee>, CoreError> {
        Ok((1..=count)
            .map(|n| {
                let display_name = format!("Participant {cohort_number}.{n}");
                Enrollee {
                    address: Some(ShippingAddress {
                        full_name: display_name.clone(),
                        street1: format!("{} Main St", 100 + n),
                        street2: None,
                        city: "Austin".to_string(),
                        state: "TX".to_string(),
                        zip_code: "73301".to_string(),
                    }),
                    display_name,
                    enrolled_at: None,
                }
            })
            .collect())
    }
}

/// A freshly created cohort and its participant records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortBatch {
    pub cohort: Cohort,
    pub participants: Vec<ParticipantShipping>,
}

/// Builds cohorts from closed windows.
#[derive(Debug, Clone, Copy)]
pub struct CohortFactory<'a> {
    source: &'a dyn EnrollmentSource,
}

impl<'a> CohortFactory<'a> {
    #[must_use]
    pub const fn new(source: &'a dyn EnrollmentSource) -> Self {
        Self { source }
    }

    /// Create cohort `cohort_number` holding `enrolled_count` participants.
    ///
    /// The caller guarantees `cohort_number` is the next unused number for the
    /// study.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a zero cohort number, an empty
    /// cohort, or a source that returns the wrong number of enrollees.
    pub fn create_cohort(
        &self,
        study_id: &str,
        cohort_number: u32,
        enrolled_count: u32,
        window_opened_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<CohortBatch, CoreError> {
        if cohort_number == 0 {
            return Err(CoreError::Validation(
                "cohort numbers start at 1".to_string(),
            ));
        }
        if enrolled_count == 0 {
            return Err(CoreError::Validation(
                "a cohort needs at least one participant".to_string(),
            ));
        }

        let enrollees = self
            .source
            .enrollees(study_id, cohort_number, enrolled_count)?;
        if enrollees.len() != enrolled_count as usize {
            return Err(CoreError::Validation(format!(
                "enrollment source returned {} enrollees for a window of {enrolled_count}",
                enrollees.len()
            )));
        }

        let cohort_id = ids::cohort_id(study_id, cohort_number);
        let participants: Vec<ParticipantShipping> = enrollees
            .into_iter()
            .enumerate()
            .map(|(index, enrollee)| ParticipantShipping {
                participant_id: ids::participant_id(&cohort_id, index),
                study_id: study_id.to_string(),
                cohort_id: cohort_id.clone(),
                status: ShippingStatus::ReadyToShip,
                initials: ids::initials(&enrollee.display_name),
                display_name: enrollee.display_name,
                address: enrollee.address,
                tracking_number: None,
                tracking_carrier: None,
                enrolled_at: enrollee.enrolled_at.unwrap_or(now),
                shipped_at: None,
                delivered_at: None,
            })
            .collect();

        #[allow(clippy::cast_possible_truncation)]
        let addresses_collected = participants.iter().filter(|p| p.address.is_some()).count() as u32;

        let cohort = Cohort {
            id: cohort_id,
            study_id: study_id.to_string(),
            cohort_number,
            status: CohortStatus::PendingShipment,
            window_opened_at,
            window_closed_at: now,
            participant_ids: participants
                .iter()
                .map(|p| p.participant_id.clone())
                .collect(),
            addresses_collected,
            tracking_codes_entered: 0,
            all_tracking_entered: false,
            delivered_count: 0,
        };

        Ok(CohortBatch {
            cohort,
            participants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct ShortSource;

    impl EnrollmentSource for ShortSource {
        fn enrollees(&self, _: &str, _: u32, count: u32) -> Result<Vec<Enrollee>, CoreError> {
            PlaceholderEnrollments.enrollees("", 1, count.saturating_sub(1))
        }
    }

    #[derive(Debug)]
    struct AddresslessSource;

    impl EnrollmentSource for AddresslessSource {
        fn enrollees(&self, _: &str, _: u32, count: u32) -> Result<Vec<Enrollee>, CoreError> {
            Ok((0..count)
                .map(|i| Enrollee {
                    display_name: format!("Anon {i}"),
                    address: (i % 2 == 0).then(|| ShippingAddress {
                        full_name: format!("Anon {i}"),
                        street1: "1 Elm St".into(),
                        street2: Some("Apt 2".into()),
                        city: "Denver".into(),
                        state: "CO".into(),
                        zip_code: "80202".into(),
                    }),
                    enrolled_at: None,
                })
                .collect())
        }
    }

    #[test]
    fn creates_pending_cohort_with_ready_participants() {
        let now = Utc::now();
        let opened = now - Duration::hours(24);
        let batch = CohortFactory::new(&PlaceholderEnrollments)
            .create_cohort("s1", 1, 30, opened, now)
            .unwrap();

        assert_eq!(batch.cohort.id, "s1-cohort-1");
        assert_eq!(batch.cohort.cohort_number, 1);
        assert_eq!(batch.cohort.status, CohortStatus::PendingShipment);
        assert_eq!(batch.cohort.participant_ids.len(), 30);
        assert_eq!(batch.cohort.addresses_collected, 30);
        assert_eq!(batch.cohort.tracking_codes_entered, 0);
        assert!(!batch.cohort.all_tracking_entered);
        assert_eq!(batch.cohort.window_opened_at, opened);
        assert_eq!(batch.cohort.window_closed_at, now);

        assert_eq!(batch.participants.len(), 30);
        assert_eq!(batch.participants[0].participant_id, "s1-cohort-1-p0");
        assert_eq!(batch.participants[29].participant_id, "s1-cohort-1-p29");
        assert!(batch.participants.iter().all(|p| {
            p.status == ShippingStatus::ReadyToShip
                && p.tracking_number.is_none()
                && p.cohort_id == "s1-cohort-1"
                && p.enrolled_at == now
        }));
    }

    #[test]
    fn participant_ids_match_cohort_roster() {
        let now = Utc::now();
        let batch = CohortFactory::new(&PlaceholderEnrollments)
            .create_cohort("s1", 3, 4, now, now)
            .unwrap();
        let ids: Vec<_> = batch
            .participants
            .iter()
            .map(|p| p.participant_id.clone())
            .collect();
        assert_eq!(ids, batch.cohort.participant_ids);
    }

    #[test]
    fn addresses_collected_counts_supplied_addresses() {
        let now = Utc::now();
        let batch = CohortFactory::new(&AddresslessSource)
            .create_cohort("s1", 1, 5, now, now)
            .unwrap();
        assert_eq!(batch.cohort.addresses_collected, 3);
        assert_eq!(batch.participants[0].initials, "A0");
    }

    #[test]
    fn rejects_empty_cohort() {
        let now = Utc::now();
        let err = CohortFactory::new(&PlaceholderEnrollments)
            .create_cohort("s1", 1, 0, now, now)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn rejects_zero_cohort_number() {
        let now = Utc::now();
        let err = CohortFactory::new(&PlaceholderEnrollments)
            .create_cohort("s1", 0, 3, now, now)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn rejects_short_source() {
        let now = Utc::now();
        let err = CohortFactory::new(&ShortSource)
            .create_cohort("s1", 1, 3, now, now)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
