//! Status enums, entity types, and trail actions for Roster.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// RecruitmentStatus
// ---------------------------------------------------------------------------

/// Recruitment lifecycle of a study.
///
/// ```text
/// waitlist_only → window_open → window_closed → ready_to_open → window_open
///                             → ready_to_open  → complete
///                               (no enrollees)
///                 window_closed → complete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecruitmentStatus {
    WaitlistOnly,
    WindowOpen,
    WindowClosed,
    ReadyToOpen,
    Complete,
}

impl RecruitmentStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::WaitlistOnly => &[Self::WindowOpen],
            Self::WindowOpen => &[Self::WindowClosed, Self::ReadyToOpen],
            Self::WindowClosed => &[Self::ReadyToOpen, Self::Complete],
            Self::ReadyToOpen => &[Self::WindowOpen, Self::Complete],
            Self::Complete => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WaitlistOnly => "waitlist_only",
            Self::WindowOpen => "window_open",
            Self::WindowClosed => "window_closed",
            Self::ReadyToOpen => "ready_to_open",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for RecruitmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CohortStatus
// ---------------------------------------------------------------------------

/// Fulfillment status of a cohort.
///
/// ```text
/// pending_shipment → shipping → complete
///                  → complete (single-participant cohort)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CohortStatus {
    PendingShipment,
    Shipping,
    Complete,
}

impl CohortStatus {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::PendingShipment => &[Self::Shipping, Self::Complete],
            Self::Shipping => &[Self::Complete],
            Self::Complete => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingShipment => "pending_shipment",
            Self::Shipping => "shipping",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for CohortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ShippingStatus
// ---------------------------------------------------------------------------

/// Shipping status of a single participant.
///
/// ```text
/// ready_to_ship → shipped → delivered
/// ```
///
/// Re-entering a tracking code for a `shipped` participant keeps it `shipped`;
/// that is a correction, not a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    ReadyToShip,
    Shipped,
    Delivered,
}

impl ShippingStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::ReadyToShip => &[Self::Shipped],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether a participant in this status must carry a tracking number.
    #[must_use]
    pub const fn requires_tracking(self) -> bool {
        matches!(self, Self::Shipped | Self::Delivered)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadyToShip => "ready_to_ship",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Carrier
// ---------------------------------------------------------------------------

/// Shipping carrier inferred from a tracking code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Carrier {
    #[serde(rename = "UPS")]
    Ups,
    #[serde(rename = "FedEx")]
    FedEx,
    #[serde(rename = "USPS")]
    Usps,
    #[serde(rename = "DHL")]
    Dhl,
}

impl Carrier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ups => "UPS",
            Self::FedEx => "FedEx",
            Self::Usps => "USPS",
            Self::Dhl => "DHL",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Persisted entity kinds. Used in errors and trail records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Recruitment,
    Cohort,
    Participant,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recruitment => "recruitment",
            Self::Cohort => "cohort",
            Self::Participant => "participant",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TrailOp
// ---------------------------------------------------------------------------

/// Kind of mutation recorded in the JSONL trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrailOp {
    Create,
    Update,
    Transition,
}

impl TrailOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Transition => "transition",
        }
    }
}

impl fmt::Display for TrailOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
