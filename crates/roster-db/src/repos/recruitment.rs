//! Recruitment state repository: the state row plus its window history.
//!
//! A loaded state is fully hydrated: `window_history` from
//! `recruitment_windows`, `cohorts` (with rosters) from the cohort repo.

use chrono::{DateTime, Utc};
use roster_core::entities::{StudyRecruitmentState, WindowRecord};
use roster_core::enums::{EntityType, RecruitmentStatus};
use roster_core::errors::CoreError;
use roster_core::responses::DueWindow;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_opt_string, get_u32, parse_datetime, parse_enum, parse_optional_datetime,
};
use crate::repos::cohort;
use crate::service::RosterService;

const STATE_COLS: &str = "study_id, status, total_enrolled, target_participants, waitlist_count, \
    current_window_ends_at, current_window_enrolled, current_cohort_id, conversion_rate, \
    created_at, updated_at";

fn row_to_state(row: &libsql::Row) -> Result<StudyRecruitmentState, DatabaseError> {
    Ok(StudyRecruitmentState {
        study_id: row.get(0)?,
        status: parse_enum(&row.get::<String>(1)?)?,
        total_enrolled: get_u32(row, 2)?,
        target_participants: get_u32(row, 3)?,
        waitlist_count: get_u32(row, 4)?,
        current_window_ends_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        current_window_enrolled: get_u32(row, 6)?,
        current_cohort_id: get_opt_string(row, 7)?,
        cohorts: Vec::new(),
        window_history: Vec::new(),
        conversion_rate: row.get(8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn row_to_window(row: &libsql::Row) -> Result<WindowRecord, DatabaseError> {
    Ok(WindowRecord {
        waitlist_at_open: get_u32(row, 0)?,
        enrolled: get_u32(row, 1)?,
        opened_at: parse_datetime(&row.get::<String>(2)?)?,
        closed_at: parse_optional_datetime(get_opt_string(row, 3)?.as_deref())?,
    })
}

async fn hydrate(
    conn: &libsql::Connection,
    mut state: StudyRecruitmentState,
) -> Result<StudyRecruitmentState, DatabaseError> {
    state.window_history = list_windows(conn, &state.study_id).await?;
    state.cohorts = cohort::list_for_study(conn, &state.study_id).await?;
    Ok(state)
}

/// Load a study's full recruitment state, or `None` if it was never initialized.
///
/// # Errors
///
/// Returns `DatabaseError` if a query fails or a row cannot be parsed.
pub async fn find(
    conn: &libsql::Connection,
    study_id: &str,
) -> Result<Option<StudyRecruitmentState>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {STATE_COLS} FROM recruitment_states WHERE study_id = ?1"),
            [study_id],
        )
        .await?;
    let Some(row) = rows.next().await? else {
        return Ok(None);
    };
    let state = row_to_state(&row)?;
    Ok(Some(hydrate(conn, state).await?))
}

/// Load a study's recruitment state.
///
/// # Errors
///
/// `CoreError::NotFound` (wrapped) for an unknown study.
pub async fn load(
    conn: &libsql::Connection,
    study_id: &str,
) -> Result<StudyRecruitmentState, DatabaseError> {
    find(conn, study_id)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityType::Recruitment, study_id).into())
}

async fn list_windows(
    conn: &libsql::Connection,
    study_id: &str,
) -> Result<Vec<WindowRecord>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT waitlist_at_open, enrolled, opened_at, closed_at
             FROM recruitment_windows WHERE study_id = ?1 ORDER BY seq",
            [study_id],
        )
        .await?;
    let mut windows = Vec::new();
    while let Some(row) = rows.next().await? {
        windows.push(row_to_window(&row)?);
    }
    Ok(windows)
}

/// Write the state row, its window history, and its cohort rows.
///
/// Participant rows are written separately by the participant repo.
///
/// # Errors
///
/// Returns `DatabaseError` if any statement fails, including a duplicate
/// cohort number for the study.
pub async fn save(
    conn: &libsql::Connection,
    state: &StudyRecruitmentState,
) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO recruitment_states ({STATE_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(study_id) DO UPDATE SET
                status = excluded.status,
                total_enrolled = excluded.total_enrolled,
                waitlist_count = excluded.waitlist_count,
                current_window_ends_at = excluded.current_window_ends_at,
                current_window_enrolled = excluded.current_window_enrolled,
                current_cohort_id = excluded.current_cohort_id,
                conversion_rate = excluded.conversion_rate,
                updated_at = excluded.updated_at"
        ),
        libsql::params![
            state.study_id.as_str(),
            state.status.as_str(),
            i64::from(state.total_enrolled),
            i64::from(state.target_participants),
            i64::from(state.waitlist_count),
            state.current_window_ends_at.as_ref().map(fmt_datetime),
            i64::from(state.current_window_enrolled),
            state.current_cohort_id.as_deref(),
            state.conversion_rate,
            fmt_datetime(&state.created_at),
            fmt_datetime(&state.updated_at)
        ],
    )
    .await?;

    for (seq, window) in state.window_history.iter().enumerate() {
        conn.execute(
            "INSERT INTO recruitment_windows (study_id, seq, waitlist_at_open, enrolled, opened_at, closed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(study_id, seq) DO UPDATE SET
                enrolled = excluded.enrolled,
                closed_at = excluded.closed_at",
            libsql::params![
                state.study_id.as_str(),
                i64::try_from(seq).map_err(|e| DatabaseError::InvalidState(e.to_string()))?,
                i64::from(window.waitlist_at_open),
                i64::from(window.enrolled),
                fmt_datetime(&window.opened_at),
                window.closed_at.as_ref().map(fmt_datetime)
            ],
        )
        .await?;
    }

    for c in &state.cohorts {
        cohort::upsert(conn, c).await?;
    }
    Ok(())
}

impl RosterService {
    /// Current recruitment state of a study.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown study.
    pub async fn get_recruitment_state(
        &self,
        study_id: &str,
    ) -> Result<StudyRecruitmentState, DatabaseError> {
        let _gate = self.read_gate().await;
        load(self.db().conn(), study_id).await
    }

    /// Studies most recently updated first, optionally only those in `status`.
    ///
    /// The status filter runs in SQL, so `limit` counts matching studies.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn list_recruitment_states(
        &self,
        status: Option<RecruitmentStatus>,
        limit: u32,
    ) -> Result<Vec<StudyRecruitmentState>, DatabaseError> {
        let _gate = self.read_gate().await;
        let conn = self.db().conn();
        let mut rows = match status {
            Some(status) => {
                conn.query(
                    &format!(
                        "SELECT {STATE_COLS} FROM recruitment_states
                         WHERE status = ?1
                         ORDER BY updated_at DESC, study_id LIMIT ?2"
                    ),
                    libsql::params![status.as_str(), i64::from(limit)],
                )
                .await?
            }
            None => {
                conn.query(
                    &format!(
                        "SELECT {STATE_COLS} FROM recruitment_states
                         ORDER BY updated_at DESC, study_id LIMIT ?1"
                    ),
                    [i64::from(limit)],
                )
                .await?
            }
        };
        let mut states = Vec::new();
        while let Some(row) = rows.next().await? {
            states.push(row_to_state(&row)?);
        }
        let mut hydrated = Vec::with_capacity(states.len());
        for state in states {
            hydrated.push(hydrate(conn, state).await?);
        }
        Ok(hydrated)
    }

    /// Studies whose open window's advisory deadline is at or before `now`.
    ///
    /// Nothing closes these automatically; an outside scheduler is expected
    /// to issue `close_window` for each.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn list_due_windows(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<DueWindow>, DatabaseError> {
        let _gate = self.read_gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT study_id, current_window_ends_at, current_window_enrolled
                 FROM recruitment_states
                 WHERE status = ?1
                   AND current_window_ends_at IS NOT NULL
                   AND current_window_ends_at <= ?2
                 ORDER BY current_window_ends_at, study_id",
                libsql::params![RecruitmentStatus::WindowOpen.as_str(), fmt_datetime(&now)],
            )
            .await?;
        let mut due = Vec::new();
        while let Some(row) = rows.next().await? {
            due.push(DueWindow {
                study_id: row.get(0)?,
                ends_at: parse_datetime(&row.get::<String>(1)?)?,
                enrolled: get_u32(&row, 2)?,
            });
        }
        Ok(due)
    }
}
