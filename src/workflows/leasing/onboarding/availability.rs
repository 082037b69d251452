use std::fmt;

use serde::Serialize;

use super::domain::{Lease, LeaseStatus, Space, SpaceStatus};

/// Why a space cannot take a new lease right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    SpaceInactive,
    NotOpenForLease,
    ActiveLeaseExists,
}

impl UnavailableReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SpaceInactive => "space is inactive",
            Self::NotOpenForLease => "space is not open for leasing",
            Self::ActiveLeaseExists => "space already holds an active lease",
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the pure availability check. `ActiveLeaseExists` on a space
/// whose status reads AVAILABLE exposes a status/ledger discrepancy to the
/// caller rather than hiding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailabilityReport {
    pub available: bool,
    pub status: SpaceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
}

/// Assess whether `space` can take a new lease. Pure read, no side effects;
/// `active_lease` is the ACTIVE lease currently referencing the space, if any.
pub fn assess(space: &Space, active_lease: Option<&Lease>) -> AvailabilityReport {
    let reason = if !space.active {
        Some(UnavailableReason::SpaceInactive)
    } else if space.status != SpaceStatus::Available {
        Some(UnavailableReason::NotOpenForLease)
    } else if active_lease.is_some_and(|lease| lease.status == LeaseStatus::Active) {
        Some(UnavailableReason::ActiveLeaseExists)
    } else {
        None
    };

    AvailabilityReport {
        available: reason.is_none(),
        status: space.status,
        reason,
    }
}
