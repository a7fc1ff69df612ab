//! A 50-seat study recruited over two windows through `RosterService`, plus
//! concurrent commands against the same study.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use roster_core::clock::ManualClock;
use roster_core::entities::StudyRecruitmentState;
use roster_core::enums::{CohortStatus, RecruitmentStatus};
use roster_db::service::RosterService;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

async fn service() -> (RosterService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let svc = RosterService::new_local(":memory:", None)
        .await
        .unwrap()
        .with_clock(clock.clone());
    (svc, clock)
}

fn assert_invariants(state: &StudyRecruitmentState) {
    assert!(state.total_enrolled <= state.target_participants);
    assert!(state.total_enrolled + state.current_window_enrolled <= state.target_participants);
    for cohort in &state.cohorts {
        assert!(cohort.tracking_codes_entered <= cohort.size());
        assert_eq!(
            cohort.all_tracking_entered,
            cohort.tracking_codes_entered == cohort.size()
        );
    }
}

async fn track_cohort(svc: &RosterService, study_id: &str, cohort_id: &str) -> StudyRecruitmentState {
    let participants = svc.get_cohort_participants(cohort_id).await.unwrap();
    let mut last = None;
    for (i, p) in participants.iter().enumerate() {
        let response = svc
            .enter_tracking_code(study_id, &p.participant_id, &format!("1Z{:016}", i))
            .await
            .unwrap();
        assert_invariants(&response.recruitment);
        last = Some(response.recruitment);
    }
    last.expect("cohort has participants")
}

#[tokio::test]
async fn fifty_seat_study_completes_over_two_windows() {
    let (svc, clock) = service().await;

    // A
    let state = svc.initialize_study("s1", 50, Some(100)).await.unwrap();
    assert_eq!(state.status, RecruitmentStatus::WaitlistOnly);
    assert_eq!(state.total_enrolled, 0);

    // B
    let state = svc.go_live("s1").await.unwrap();
    assert_eq!(state.status, RecruitmentStatus::WindowOpen);
    assert_eq!(state.window_history[0].waitlist_at_open, 100);
    assert_eq!(state.window_history[0].enrolled, 0);

    // C
    assert_eq!(svc.enroll("s1", 30).await.unwrap().accepted, 30);
    clock.advance(Duration::hours(24));
    let state = svc.close_window("s1").await.unwrap();
    assert_eq!(state.status, RecruitmentStatus::WindowClosed);
    assert_eq!(state.total_enrolled, 30);
    let cohort = state.cohorts.first().unwrap();
    assert_eq!(cohort.participant_ids.len(), 30);
    assert_eq!(cohort.tracking_codes_entered, 0);

    // D
    let state = track_cohort(&svc, "s1", "s1-cohort-1").await;
    assert_eq!(state.cohorts[0].status, CohortStatus::Complete);
    assert!(state.cohorts[0].all_tracking_entered);
    assert_eq!(state.status, RecruitmentStatus::ReadyToOpen);

    // E
    clock.advance(Duration::hours(24));
    let state = svc.open_window("s1").await.unwrap();
    assert_eq!(state.status, RecruitmentStatus::WindowOpen);
    assert_eq!(state.window_history[1].waitlist_at_open, 70);
    assert_eq!(svc.enroll("s1", 40).await.unwrap().accepted, 20);
    clock.advance(Duration::hours(24));
    let state = svc.close_window("s1").await.unwrap();
    assert_eq!(state.total_enrolled, 50);
    assert_eq!(state.current_cohort_id.as_deref(), Some("s1-cohort-2"));

    let state = track_cohort(&svc, "s1", "s1-cohort-2").await;
    assert_eq!(state.status, RecruitmentStatus::Complete);
    assert_eq!(state.cohorts.len(), 2);
    assert!((state.conversion_rate - 50.0 / 170.0).abs() < 1e-9);
    assert_invariants(&state);

    let stored = svc.get_recruitment_state("s1").await.unwrap();
    assert_eq!(stored, state);
    assert!(svc.open_window("s1").await.unwrap_err().is_invalid_transition());
}

#[tokio::test]
async fn concurrent_enrollments_never_overfill() {
    let (svc, _clock) = service().await;
    svc.initialize_study("s1", 10, Some(100)).await.unwrap();
    svc.go_live("s1").await.unwrap();

    let (a, b, c, d) = tokio::join!(
        svc.enroll("s1", 4),
        svc.enroll("s1", 4),
        svc.enroll("s1", 4),
        svc.enroll("s1", 4),
    );
    let accepted: u32 = [a, b, c, d]
        .into_iter()
        .map(|r| r.unwrap().accepted)
        .sum();
    assert_eq!(accepted, 10);

    let state = svc.get_recruitment_state("s1").await.unwrap();
    assert_eq!(state.current_window_enrolled, 10);
    assert_eq!(state.waitlist_count, 90);
}

#[tokio::test]
async fn concurrent_duplicate_closes_create_one_cohort() {
    let (svc, _clock) = service().await;
    svc.initialize_study("s1", 10, Some(100)).await.unwrap();
    svc.go_live("s1").await.unwrap();
    svc.enroll("s1", 3).await.unwrap();

    let (first, second) = tokio::join!(svc.close_window("s1"), svc.close_window("s1"));
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(roster_db::error::DatabaseError::is_invalid_transition)
    );

    let state = svc.get_recruitment_state("s1").await.unwrap();
    assert_eq!(state.cohorts.len(), 1);
    assert_eq!(state.total_enrolled, 3);
}

#[tokio::test]
async fn studies_progress_independently() {
    let (svc, _clock) = service().await;
    svc.initialize_study("a", 5, Some(10)).await.unwrap();
    svc.initialize_study("b", 5, Some(10)).await.unwrap();

    let (a, b) = tokio::join!(svc.go_live("a"), svc.go_live("b"));
    assert_eq!(a.unwrap().status, RecruitmentStatus::WindowOpen);
    assert_eq!(b.unwrap().status, RecruitmentStatus::WindowOpen);

    svc.enroll("a", 5).await.unwrap();
    svc.close_window("a").await.unwrap();
    let b = svc.get_recruitment_state("b").await.unwrap();
    assert_eq!(b.status, RecruitmentStatus::WindowOpen);
    assert!(b.cohorts.is_empty());
}

#[tokio::test]
async fn filling_the_target_completes_on_last_tracking_code() {
    let (svc, _clock) = service().await;
    svc.initialize_study("s1", 2, Some(10)).await.unwrap();
    svc.go_live("s1").await.unwrap();
    svc.enroll("s1", 2).await.unwrap();
    svc.close_window("s1").await.unwrap();
    let state = track_cohort(&svc, "s1", "s1-cohort-1").await;
    assert_eq!(state.status, RecruitmentStatus::Complete);
    assert_eq!(state.current_cohort_id, None);
}

#[tokio::test]
async fn open_window_on_full_ready_study_completes_without_new_window() {
    let (svc, _clock) = service().await;
    svc.initialize_study("s1", 2, Some(10)).await.unwrap();
    svc.go_live("s1").await.unwrap();
    svc.enroll("s1", 2).await.unwrap();
    svc.close_window("s1").await.unwrap();
    track_cohort(&svc, "s1", "s1-cohort-1").await;

    // A full study left in ready_to_open, e.g. by a hand-repaired row.
    svc.db()
        .conn()
        .execute(
            "UPDATE recruitment_states SET status = 'ready_to_open' WHERE study_id = ?1",
            ["s1"],
        )
        .await
        .unwrap();
    let before = svc.get_recruitment_state("s1").await.unwrap();
    assert_eq!(before.status, RecruitmentStatus::ReadyToOpen);

    let state = svc.open_window("s1").await.unwrap();
    assert_eq!(state.status, RecruitmentStatus::Complete);
    assert_eq!(state.window_history.len(), before.window_history.len());
    assert_eq!(state.current_window_ends_at, None);
    assert_eq!(
        svc.get_recruitment_state("s1").await.unwrap().status,
        RecruitmentStatus::Complete
    );
    assert!(svc.open_window("s1").await.unwrap_err().is_invalid_transition());
}
