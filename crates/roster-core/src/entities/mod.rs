//! Entity structs for all Roster domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `roster-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod cohort;
mod participant;
mod recruitment;

pub use cohort::Cohort;
pub use participant::{ParticipantShipping, ShippingAddress};
pub use recruitment::{StudyRecruitmentState, WindowRecord};
