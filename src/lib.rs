//! Property-management backend centered on the lease onboarding workflow:
//! provisioning a login account, resolving an identity document, creating the
//! tenant profile and lease, and flipping the space's occupancy state as one
//! logical operation.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
