use serde::Deserialize;

use super::domain::{
    AccountId, ActorId, DocumentClaim, IdentityDocument, Lease, LeaseId, LeaseStatus, LeaseTerms,
    Space, SpaceId, SpaceStatus, SpaceType, Tenant, TenantId, TenantIntake,
};

/// Tenant row fields handed to the store by the orchestrator.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub intake: TenantIntake,
    pub account_id: AccountId,
    pub registered_by: ActorId,
}

/// Write set applied atomically when an onboarding reaches the persistence
/// layer: resolve the identity document, create the tenant, create the ACTIVE
/// lease, and flip the space to OCCUPIED. Either all of it commits or none.
#[derive(Debug, Clone)]
pub struct OnboardingCommit {
    pub space_id: SpaceId,
    pub tenant: NewTenant,
    pub lease: LeaseTerms,
}

/// What the store reports back after a committed onboarding.
#[derive(Debug, Clone)]
pub struct OnboardingOutcome {
    pub lease: Lease,
    pub tenant: Tenant,
    pub document: IdentityDocument,
    pub space_status_before: SpaceStatus,
    pub space_status_after: SpaceStatus,
}

/// What the store reports back after a committed termination.
#[derive(Debug, Clone)]
pub struct TerminationOutcome {
    pub lease: Lease,
    pub space: Space,
}

/// Lease joined with its tenant, document, and space as stored. The account
/// is resolved separately through the directory capability.
#[derive(Debug, Clone)]
pub struct HydratedLease {
    pub lease: Lease,
    pub tenant: Tenant,
    pub document: IdentityDocument,
    pub space: Space,
    pub space_type: SpaceType,
}

/// Filters for the collaborating list surface.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LeaseFilter {
    #[serde(default)]
    pub status: Option<LeaseStatus>,
    #[serde(default)]
    pub space_id: Option<SpaceId>,
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
}

/// Storage abstraction for the leasing workflow.
///
/// Implementations must make `commit_onboarding` and `terminate_lease`
/// atomic, and must re-verify space availability and document bindings inside
/// `commit_onboarding` so two racing onboardings of one space cannot both
/// pass the orchestrator's earlier read: the loser gets a `Conflict` and no
/// write survives. SQL-backed implementations may rely on a unique
/// at-most-one-ACTIVE-lease-per-space constraint for the same guarantee, and
/// on a unique document-number constraint for `resolve_document` (a
/// violation there means another writer won the find-or-create; re-run the
/// find).
pub trait LeasingRepository: Send + Sync {
    fn space(&self, id: &SpaceId) -> Result<Option<Space>, RepositoryError>;

    fn space_with_type(&self, id: &SpaceId)
        -> Result<Option<(Space, SpaceType)>, RepositoryError>;

    /// The ACTIVE lease currently referencing `id`, if any.
    fn active_lease_for_space(&self, id: &SpaceId) -> Result<Option<Lease>, RepositoryError>;

    /// Find-or-create a document row by number. Fails with
    /// [`ConflictCause::DocumentBound`] when the number belongs to another
    /// active tenant. Idempotent for concurrent identical calls.
    fn resolve_document(&self, claim: &DocumentClaim)
        -> Result<IdentityDocument, RepositoryError>;

    fn commit_onboarding(
        &self,
        commit: OnboardingCommit,
    ) -> Result<OnboardingOutcome, RepositoryError>;

    /// Set the lease TERMINATED and its space AVAILABLE in one atomic write,
    /// the exact inverse of onboarding's state transition.
    fn terminate_lease(&self, id: &LeaseId) -> Result<TerminationOutcome, RepositoryError>;

    fn hydrated_lease(&self, id: &LeaseId) -> Result<Option<HydratedLease>, RepositoryError>;

    fn leases(&self, filter: &LeaseFilter) -> Result<Vec<HydratedLease>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Conflict(#[from] ConflictCause),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Conflicts a commit can answer with; each one maps to a state another
/// writer or an earlier onboarding already claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConflictCause {
    #[error("space is inactive")]
    SpaceInactive,
    #[error("space is not open for leasing")]
    SpaceNotOpen,
    #[error("space already holds an active lease")]
    SpaceLeased,
    #[error("identity document is bound to another active tenant")]
    DocumentBound,
    #[error("lease is already terminated")]
    LeaseTerminated,
}
