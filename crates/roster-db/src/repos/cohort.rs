//! Cohort repository.
//!
//! `participant_ids` is not stored on the cohort row; it is the cohort's
//! participant rows in creation order.

use roster_core::entities::{Cohort, ParticipantShipping};
use roster_core::enums::EntityType;
use roster_core::errors::CoreError;
use roster_core::responses::{CohortProgress, CohortProgressResponse};

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, get_u32, parse_datetime, parse_enum};
use crate::repos::participant;
use crate::service::RosterService;

const COHORT_COLS: &str = "id, study_id, cohort_number, status, window_opened_at, window_closed_at, \
    addresses_collected, tracking_codes_entered, all_tracking_entered, delivered_count";

fn row_to_cohort(row: &libsql::Row) -> Result<Cohort, DatabaseError> {
    Ok(Cohort {
        id: row.get(0)?,
        study_id: row.get(1)?,
        cohort_number: get_u32(row, 2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        window_opened_at: parse_datetime(&row.get::<String>(4)?)?,
        window_closed_at: parse_datetime(&row.get::<String>(5)?)?,
        participant_ids: Vec::new(),
        addresses_collected: get_u32(row, 6)?,
        tracking_codes_entered: get_u32(row, 7)?,
        all_tracking_entered: row.get::<i64>(8)? != 0,
        delivered_count: get_u32(row, 9)?,
    })
}

/// Cohorts of a study in cohort-number order, rosters included.
///
/// # Errors
///
/// Returns `DatabaseError` if a query fails or a row cannot be parsed.
pub async fn list_for_study(
    conn: &libsql::Connection,
    study_id: &str,
) -> Result<Vec<Cohort>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {COHORT_COLS} FROM cohorts WHERE study_id = ?1 ORDER BY cohort_number"),
            [study_id],
        )
        .await?;
    let mut cohorts = Vec::new();
    while let Some(row) = rows.next().await? {
        cohorts.push(row_to_cohort(&row)?);
    }
    for cohort in &mut cohorts {
        cohort.participant_ids = participant::ids_for_cohort(conn, &cohort.id).await?;
    }
    Ok(cohorts)
}

/// A single cohort with its roster.
///
/// # Errors
///
/// `CoreError::NotFound` (wrapped) for an unknown cohort.
pub async fn get(conn: &libsql::Connection, cohort_id: &str) -> Result<Cohort, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {COHORT_COLS} FROM cohorts WHERE id = ?1"),
            [cohort_id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreError::not_found(EntityType::Cohort, cohort_id))?;
    let mut cohort = row_to_cohort(&row)?;
    cohort.participant_ids = participant::ids_for_cohort(conn, cohort_id).await?;
    Ok(cohort)
}

/// Insert a new cohort or refresh the fulfillment counters of an existing one.
///
/// # Errors
///
/// Returns `DatabaseError` if the statement fails, e.g. a second cohort with
/// the same number for the study.
pub async fn upsert(conn: &libsql::Connection, cohort: &Cohort) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO cohorts ({COHORT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                addresses_collected = excluded.addresses_collected,
                tracking_codes_entered = excluded.tracking_codes_entered,
                all_tracking_entered = excluded.all_tracking_entered,
                delivered_count = excluded.delivered_count"
        ),
        libsql::params![
            cohort.id.as_str(),
            cohort.study_id.as_str(),
            i64::from(cohort.cohort_number),
            cohort.status.as_str(),
            fmt_datetime(&cohort.window_opened_at),
            fmt_datetime(&cohort.window_closed_at),
            i64::from(cohort.addresses_collected),
            i64::from(cohort.tracking_codes_entered),
            i64::from(cohort.all_tracking_entered),
            i64::from(cohort.delivered_count)
        ],
    )
    .await?;
    Ok(())
}

impl RosterService {
    /// Shipping records of a cohort in creation order.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown cohort.
    pub async fn get_cohort_participants(
        &self,
        cohort_id: &str,
    ) -> Result<Vec<ParticipantShipping>, DatabaseError> {
        let _gate = self.read_gate().await;
        let conn = self.db().conn();
        get(conn, cohort_id).await?;
        participant::list_by_cohort(conn, cohort_id).await
    }

    /// Stored cohort plus its live fulfillment pipeline.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown cohort.
    pub async fn cohort_progress(
        &self,
        cohort_id: &str,
    ) -> Result<CohortProgressResponse, DatabaseError> {
        let _gate = self.read_gate().await;
        let conn = self.db().conn();
        let cohort = get(conn, cohort_id).await?;
        let participants = participant::list_by_cohort(conn, cohort_id).await?;
        Ok(CohortProgressResponse {
            cohort,
            progress: CohortProgress::from_participants(&participants),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::recruitment;
    use crate::test_support::{t0, test_service};
    use pretty_assertions::assert_eq;
    use roster_core::controller::{RecruitmentPolicy, WindowClosing};
    use roster_core::entities::StudyRecruitmentState;
    use roster_core::factory::{CohortFactory, PlaceholderEnrollments};

    async fn closed_study(conn: &libsql::Connection) -> (StudyRecruitmentState, Vec<ParticipantShipping>) {
        let policy = RecruitmentPolicy::default();
        let mut state = StudyRecruitmentState::new("s1", 10, 20, &policy, t0()).unwrap();
        state.go_live(&policy, t0()).unwrap();
        state.enroll(3, t0()).unwrap();
        let WindowClosing::Cohort(batch) = state
            .close_window(&policy, &CohortFactory::new(&PlaceholderEnrollments), t0())
            .unwrap()
        else {
            panic!("expected a cohort");
        };
        recruitment::save(conn, &state).await.unwrap();
        participant::insert_batch(conn, &batch.participants).await.unwrap();
        (state, batch.participants)
    }

    #[tokio::test]
    async fn cohort_roster_comes_from_participant_rows() {
        let (svc, _clock) = test_service().await;
        let conn = svc.db().conn();
        let (state, _) = closed_study(conn).await;

        let cohort = get(conn, "s1-cohort-1").await.unwrap();
        assert_eq!(cohort, state.cohorts[0]);
        assert_eq!(
            cohort.participant_ids,
            vec!["s1-cohort-1-p0", "s1-cohort-1-p1", "s1-cohort-1-p2"]
        );
    }

    #[tokio::test]
    async fn duplicate_cohort_number_is_rejected() {
        let (svc, _clock) = test_service().await;
        let conn = svc.db().conn();
        let (state, _) = closed_study(conn).await;

        let mut clash = state.cohorts[0].clone();
        clash.id = "s1-cohort-1b".to_string();
        assert!(upsert(conn, &clash).await.is_err());
    }

    #[tokio::test]
    async fn progress_counts_live_records() {
        let (svc, _clock) = test_service().await;
        let conn = svc.db().conn();
        let (_, mut participants) = closed_study(conn).await;

        participants[0].tracking_number = Some("1Z999AA10123456784".into());
        participants[0].status = roster_core::enums::ShippingStatus::Shipped;
        participant::update(conn, &participants[0]).await.unwrap();

        let response = svc.cohort_progress("s1-cohort-1").await.unwrap();
        assert_eq!(
            response.progress,
            CohortProgress {
                enrolled: 3,
                addresses: 3,
                shipped: 1,
                delivered: 0,
            }
        );
        assert_eq!(svc.get_cohort_participants("s1-cohort-1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_cohort_is_not_found() {
        let (svc, _clock) = test_service().await;
        assert!(svc.cohort_progress("missing").await.unwrap_err().is_not_found());
        assert!(svc
            .get_cohort_participants("missing")
            .await
            .unwrap_err()
            .is_not_found());
    }
}
