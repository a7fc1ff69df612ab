//! Participant shipping registry.
//!
//! Keyed by participant ID with a secondary index on cohort. Rows are
//! inserted once per cohort and updated in place; nothing is deleted.

use roster_core::entities::{ParticipantShipping, ShippingAddress};
use roster_core::enums::Carrier;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime,
    parse_optional_json,
};

const PARTICIPANT_COLS: &str = "participant_id, study_id, cohort_id, status, display_name, initials, \
    address, tracking_number, tracking_carrier, enrolled_at, shipped_at, delivered_at";

fn row_to_participant(row: &libsql::Row) -> Result<ParticipantShipping, DatabaseError> {
    Ok(ParticipantShipping {
        participant_id: row.get(0)?,
        study_id: row.get(1)?,
        cohort_id: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        display_name: row.get(4)?,
        initials: row.get(5)?,
        address: parse_optional_json::<ShippingAddress>(get_opt_string(row, 6)?.as_deref())?,
        tracking_number: get_opt_string(row, 7)?,
        tracking_carrier: get_opt_string(row, 8)?
            .as_deref()
            .map(parse_enum::<Carrier>)
            .transpose()?,
        enrolled_at: parse_datetime(&row.get::<String>(9)?)?,
        shipped_at: parse_optional_datetime(get_opt_string(row, 10)?.as_deref())?,
        delivered_at: parse_optional_datetime(get_opt_string(row, 11)?.as_deref())?,
    })
}

fn address_json(participant: &ParticipantShipping) -> Result<Option<String>, DatabaseError> {
    participant
        .address
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DatabaseError::Other(e.into()))
}

/// Insert a freshly created cohort's participants, keeping their order.
///
/// # Errors
///
/// Returns `DatabaseError` if any insert fails (e.g. duplicate ID or an
/// unknown cohort).
pub async fn insert_batch(
    conn: &libsql::Connection,
    participants: &[ParticipantShipping],
) -> Result<(), DatabaseError> {
    for (position, p) in participants.iter().enumerate() {
        conn.execute(
            &format!(
                "INSERT INTO participant_shipping ({PARTICIPANT_COLS}, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            ),
            libsql::params![
                p.participant_id.as_str(),
                p.study_id.as_str(),
                p.cohort_id.as_str(),
                p.status.as_str(),
                p.display_name.as_str(),
                p.initials.as_str(),
                address_json(p)?,
                p.tracking_number.as_deref(),
                p.tracking_carrier.map(Carrier::as_str),
                fmt_datetime(&p.enrolled_at),
                p.shipped_at.as_ref().map(fmt_datetime),
                p.delivered_at.as_ref().map(fmt_datetime),
                i64::try_from(position).map_err(|e| DatabaseError::InvalidState(e.to_string()))?
            ],
        )
        .await?;
    }
    Ok(())
}

/// Point lookup by participant ID.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or the row cannot be parsed.
pub async fn get(
    conn: &libsql::Connection,
    participant_id: &str,
) -> Result<Option<ParticipantShipping>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {PARTICIPANT_COLS} FROM participant_shipping WHERE participant_id = ?1"),
            [participant_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_participant(&row)?)),
        None => Ok(None),
    }
}

/// Persist the shipping fields of an existing participant.
///
/// # Errors
///
/// Returns `DatabaseError::NoResult` if the participant does not exist.
pub async fn update(
    conn: &libsql::Connection,
    p: &ParticipantShipping,
) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE participant_shipping SET
                status = ?1,
                address = ?2,
                tracking_number = ?3,
                tracking_carrier = ?4,
                shipped_at = ?5,
                delivered_at = ?6
             WHERE participant_id = ?7",
            libsql::params![
                p.status.as_str(),
                address_json(p)?,
                p.tracking_number.as_deref(),
                p.tracking_carrier.map(Carrier::as_str),
                p.shipped_at.as_ref().map(fmt_datetime),
                p.delivered_at.as_ref().map(fmt_datetime),
                p.participant_id.as_str()
            ],
        )
        .await?;
    if changed == 0 {
        return Err(DatabaseError::NoResult);
    }
    Ok(())
}

/// Participants of a cohort in creation order.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or a row cannot be parsed.
pub async fn list_by_cohort(
    conn: &libsql::Connection,
    cohort_id: &str,
) -> Result<Vec<ParticipantShipping>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {PARTICIPANT_COLS} FROM participant_shipping
                 WHERE cohort_id = ?1 ORDER BY position"
            ),
            [cohort_id],
        )
        .await?;
    let mut participants = Vec::new();
    while let Some(row) = rows.next().await? {
        participants.push(row_to_participant(&row)?);
    }
    Ok(participants)
}

/// Participant IDs of a cohort in creation order.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn ids_for_cohort(
    conn: &libsql::Connection,
    cohort_id: &str,
) -> Result<Vec<String>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT participant_id FROM participant_shipping WHERE cohort_id = ?1 ORDER BY position",
            [cohort_id],
        )
        .await?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next().await? {
        ids.push(row.get::<String>(0)?);
    }
    Ok(ids)
}
