use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Carrier, ShippingStatus};

/// Postal address a participant's product ships to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ShippingAddress {
    pub full_name: String,
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Shipping record for one enrolled participant.
///
/// Invariant: `tracking_number` is present iff `status` is `shipped` or
/// `delivered`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ParticipantShipping {
    pub participant_id: String,
    pub study_id: String,
    pub cohort_id: String,
    pub status: ShippingStatus,
    pub display_name: String,
    pub initials: String,
    pub address: Option<ShippingAddress>,
    pub tracking_number: Option<String>,
    pub tracking_carrier: Option<Carrier>,
    pub enrolled_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl ParticipantShipping {
    /// Whether a non-empty tracking number has been recorded.
    #[must_use]
    pub fn has_tracking(&self) -> bool {
        self.tracking_number
            .as_deref()
            .is_some_and(|code| !code.trim().is_empty())
    }
}
