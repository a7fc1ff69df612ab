//! Serde roundtrip and JsonSchema validation tests for all entity types.

use chrono::Utc;
use schemars::schema_for;
use roster_core::entities::*;
use roster_core::enums::*;
use roster_core::responses::*;
use roster_core::trail::TrailOperation;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn cohort() -> Cohort {
    Cohort {
        id: "s1-cohort-1".into(),
        study_id: "s1".into(),
        cohort_number: 1,
        status: CohortStatus::Shipping,
        window_opened_at: Utc::now(),
        window_closed_at: Utc::now(),
        participant_ids: vec!["s1-cohort-1-p0".into(), "s1-cohort-1-p1".into()],
        addresses_collected: 2,
        tracking_codes_entered: 1,
        all_tracking_entered: false,
        delivered_count: 0,
    }
}

fn shipped_participant() -> ParticipantShipping {
    ParticipantShipping {
        participant_id: "s1-cohort-1-p0".into(),
        study_id: "s1".into(),
        cohort_id: "s1-cohort-1".into(),
        status: ShippingStatus::Shipped,
        display_name: "Emily R.".into(),
        initials: "ER".into(),
        address: Some(ShippingAddress {
            full_name: "Emily R.".into(),
            street1: "211 Oak St".into(),
            street2: Some("Unit 4".into()),
            city: "Portland".into(),
            state: "OR".into(),
            zip_code: "97201".into(),
        }),
        tracking_number: Some("1Z999AA10123456784".into()),
        tracking_carrier: Some(Carrier::Ups),
        enrolled_at: Utc::now(),
        shipped_at: Some(Utc::now()),
        delivered_at: None,
    }
}

fn recruitment() -> StudyRecruitmentState {
    StudyRecruitmentState {
        study_id: "s1".into(),
        status: RecruitmentStatus::WindowClosed,
        total_enrolled: 2,
        target_participants: 50,
        waitlist_count: 98,
        current_window_ends_at: None,
        current_window_enrolled: 0,
        current_cohort_id: Some("s1-cohort-1".into()),
        cohorts: vec![cohort()],
        window_history: vec![WindowRecord {
            waitlist_at_open: 100,
            enrolled: 2,
            opened_at: Utc::now(),
            closed_at: Some(Utc::now()),
        }],
        conversion_rate: 0.02,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

roundtrip_and_validate!(cohort_roundtrip, Cohort, cohort());

roundtrip_and_validate!(
    participant_roundtrip,
    ParticipantShipping,
    shipped_participant()
);

roundtrip_and_validate!(
    participant_without_address_roundtrip,
    ParticipantShipping,
    ParticipantShipping {
        status: ShippingStatus::ReadyToShip,
        address: None,
        tracking_number: None,
        tracking_carrier: None,
        shipped_at: None,
        ..shipped_participant()
    }
);

roundtrip_and_validate!(recruitment_roundtrip, StudyRecruitmentState, recruitment());

roundtrip_and_validate!(
    track_response_roundtrip,
    TrackResponse,
    TrackResponse {
        participant: shipped_participant(),
        cohort: cohort(),
        recruitment: recruitment(),
    }
);

roundtrip_and_validate!(
    progress_response_roundtrip,
    CohortProgressResponse,
    CohortProgressResponse {
        cohort: cohort(),
        progress: CohortProgress {
            enrolled: 2,
            addresses: 2,
            shipped: 1,
            delivered: 0,
        },
    }
);

roundtrip_and_validate!(
    trail_operation_roundtrip,
    TrailOperation,
    TrailOperation {
        v: 1,
        ts: "2026-03-01T09:00:00Z".into(),
        study: "s1".into(),
        command: "close_window".into(),
        op: TrailOp::Create,
        entity: EntityType::Cohort,
        id: "s1-cohort-1".into(),
        data: serde_json::json!({"cohort_number": 1}),
    }
);
