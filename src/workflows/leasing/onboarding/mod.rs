//! Lease onboarding: allocating a leasable space to a new tenant by
//! provisioning a login account, resolving an identity document, creating the
//! tenant profile and lease, and flipping the space's occupancy state as one
//! logical operation with a documented rollback path.

pub mod accounts;
pub mod availability;
pub mod credentials;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use accounts::{AccountDirectory, AccountError, NewAccount, RoleDirectory};
pub use availability::{assess, AvailabilityReport, UnavailableReason};
pub use credentials::{
    verify_credential, CredentialError, TemporaryCredential, CREDENTIAL_ALPHABET,
    CREDENTIAL_DISCLAIMER, CREDENTIAL_LENGTH, MIN_CREDENTIAL_LENGTH,
};
pub use domain::{
    Account, AccountId, AccountView, ActorId, DocumentClaim, DocumentId, DocumentKind,
    IdentityDocument, Lease, LeaseDetail, LeaseId, LeaseStatus, LeaseTerms, OnboardingReceipt,
    OnboardingRequest, ProvisioningNotice, RoleId, Space, SpaceId, SpaceStatus, SpaceType,
    SpaceTypeId, Tenant, TenantId, TenantIntake, ValidationError,
};
pub use memory::{MemoryAccountDirectory, MemoryLeasingStore, StaticRoleDirectory};
pub use repository::{
    ConflictCause, HydratedLease, LeaseFilter, LeasingRepository, NewTenant, OnboardingCommit,
    OnboardingOutcome, RepositoryError, TerminationOutcome,
};
pub use router::onboarding_router;
pub use service::{ErrorKind, LeaseOnboardingService, OnboardingError};
