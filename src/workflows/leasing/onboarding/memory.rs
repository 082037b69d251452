//! In-memory store backing the served binary and the test suites.
//!
//! A single mutex guards the whole state, so every composite operation runs
//! as a serializable transaction: checks and writes happen under one guard,
//! and no write is applied until every check has passed. That closes the
//! check-then-act window between the orchestrator's availability read and the
//! space-status write.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::accounts::{AccountDirectory, AccountError, NewAccount, RoleDirectory};
use super::domain::{
    Account, AccountId, DocumentClaim, DocumentId, IdentityDocument, Lease, LeaseId, LeaseStatus,
    RoleId, Space, SpaceId, SpaceStatus, SpaceType, SpaceTypeId, Tenant, TenantId,
};
use super::repository::{
    ConflictCause, HydratedLease, LeaseFilter, LeasingRepository, OnboardingCommit,
    OnboardingOutcome, RepositoryError, TerminationOutcome,
};

#[derive(Default)]
struct StoreState {
    space_types: HashMap<SpaceTypeId, SpaceType>,
    spaces: HashMap<SpaceId, Space>,
    documents: HashMap<DocumentId, IdentityDocument>,
    tenants: HashMap<TenantId, Tenant>,
    leases: HashMap<LeaseId, Lease>,
}

#[derive(Default)]
pub struct MemoryLeasingStore {
    state: Mutex<StoreState>,
}

impl MemoryLeasingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_space_type(&self, space_type: SpaceType) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.space_types.insert(space_type.id, space_type);
        Ok(())
    }

    pub fn insert_space(&self, space: Space) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.spaces.insert(space.id, space);
        Ok(())
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

fn active_lease(state: &StoreState, space_id: &SpaceId) -> Option<Lease> {
    state
        .leases
        .values()
        .find(|lease| lease.space_id == *space_id && lease.status == LeaseStatus::Active)
        .cloned()
}

fn document_by_number(state: &StoreState, number: &str) -> Option<IdentityDocument> {
    state
        .documents
        .values()
        .find(|document| document.number == number)
        .cloned()
}

fn document_bound_to_active_tenant(state: &StoreState, document_id: &DocumentId) -> bool {
    state
        .tenants
        .values()
        .any(|tenant| tenant.document_id == *document_id && tenant.active)
}

/// Find the existing document for `claim` or stage a new row. Errors when the
/// number is claimed by an active tenant. Mirrors a unique-constraint-backed
/// find-or-create: the caller holds the state guard, so two identical calls
/// cannot interleave.
fn resolve_document_locked(
    state: &mut StoreState,
    claim: &DocumentClaim,
) -> Result<IdentityDocument, RepositoryError> {
    if let Some(existing) = document_by_number(state, &claim.number) {
        if document_bound_to_active_tenant(state, &existing.id) {
            return Err(ConflictCause::DocumentBound.into());
        }
        return Ok(existing);
    }

    let document = IdentityDocument {
        id: DocumentId(Uuid::new_v4()),
        kind: claim.kind,
        number: claim.number.clone(),
    };
    state.documents.insert(document.id, document.clone());
    Ok(document)
}

fn hydrate(state: &StoreState, lease: &Lease) -> Result<HydratedLease, RepositoryError> {
    let tenant = state.tenants.get(&lease.tenant_id).cloned().ok_or_else(|| {
        RepositoryError::Unavailable(format!("lease {} references a missing tenant", lease.id.0))
    })?;
    let document = state
        .documents
        .get(&tenant.document_id)
        .cloned()
        .ok_or_else(|| {
            RepositoryError::Unavailable(format!(
                "tenant {} references a missing document",
                tenant.id.0
            ))
        })?;
    let space = state.spaces.get(&lease.space_id).cloned().ok_or_else(|| {
        RepositoryError::Unavailable(format!("lease {} references a missing space", lease.id.0))
    })?;
    let space_type = state
        .space_types
        .get(&space.space_type_id)
        .cloned()
        .ok_or_else(|| {
            RepositoryError::Unavailable(format!(
                "space {} references a missing space type",
                space.code
            ))
        })?;

    Ok(HydratedLease {
        lease: lease.clone(),
        tenant,
        document,
        space,
        space_type,
    })
}

impl LeasingRepository for MemoryLeasingStore {
    fn space(&self, id: &SpaceId) -> Result<Option<Space>, RepositoryError> {
        let state = self.state()?;
        Ok(state.spaces.get(id).cloned())
    }

    fn space_with_type(
        &self,
        id: &SpaceId,
    ) -> Result<Option<(Space, SpaceType)>, RepositoryError> {
        let state = self.state()?;
        let Some(space) = state.spaces.get(id).cloned() else {
            return Ok(None);
        };
        let space_type = state
            .space_types
            .get(&space.space_type_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::Unavailable(format!(
                    "space {} references a missing space type",
                    space.code
                ))
            })?;
        Ok(Some((space, space_type)))
    }

    fn active_lease_for_space(&self, id: &SpaceId) -> Result<Option<Lease>, RepositoryError> {
        let state = self.state()?;
        Ok(active_lease(&state, id))
    }

    fn resolve_document(
        &self,
        claim: &DocumentClaim,
    ) -> Result<IdentityDocument, RepositoryError> {
        let mut state = self.state()?;
        resolve_document_locked(&mut state, claim)
    }

    fn commit_onboarding(
        &self,
        commit: OnboardingCommit,
    ) -> Result<OnboardingOutcome, RepositoryError> {
        let mut state = self.state()?;

        // Availability is re-verified under the guard; the orchestrator's
        // earlier read may be stale by the time the commit arrives.
        let space = state
            .spaces
            .get(&commit.space_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        if !space.active {
            return Err(ConflictCause::SpaceInactive.into());
        }
        if space.status != SpaceStatus::Available {
            return Err(ConflictCause::SpaceNotOpen.into());
        }
        if active_lease(&state, &commit.space_id).is_some() {
            return Err(ConflictCause::SpaceLeased.into());
        }

        let document = resolve_document_locked(&mut state, &commit.tenant.intake.document)?;

        // All checks passed; everything below commits together.
        let intake = commit.tenant.intake;
        let tenant = Tenant {
            id: TenantId(Uuid::new_v4()),
            full_name: intake.full_name,
            email: intake.email,
            phone: intake.phone,
            address: intake.address,
            occupation: intake.occupation,
            declared_monthly_income: intake.declared_monthly_income,
            vehicle_plate: intake.vehicle_plate,
            document_id: document.id,
            account_id: Some(commit.tenant.account_id),
            verified: false,
            active: true,
            registered_by: commit.tenant.registered_by,
            created_at: Utc::now(),
        };
        state.tenants.insert(tenant.id, tenant.clone());

        let lease = Lease {
            id: LeaseId(Uuid::new_v4()),
            tenant_id: tenant.id,
            space_id: commit.space_id,
            start_date: commit.lease.start_date,
            end_date: commit.lease.end_date,
            monthly_amount: commit.lease.monthly_amount,
            deposit: commit.lease.deposit,
            status: LeaseStatus::Active,
            notes: commit.lease.notes,
            created_at: Utc::now(),
        };
        state.leases.insert(lease.id, lease.clone());

        let space_status_before = space.status;
        if let Some(stored) = state.spaces.get_mut(&commit.space_id) {
            stored.status = SpaceStatus::Occupied;
        }

        Ok(OnboardingOutcome {
            lease,
            tenant,
            document,
            space_status_before,
            space_status_after: SpaceStatus::Occupied,
        })
    }

    fn terminate_lease(&self, id: &LeaseId) -> Result<TerminationOutcome, RepositoryError> {
        let mut state = self.state()?;

        let lease = state.leases.get(id).cloned().ok_or(RepositoryError::NotFound)?;
        if lease.status == LeaseStatus::Terminated {
            return Err(ConflictCause::LeaseTerminated.into());
        }
        if !state.spaces.contains_key(&lease.space_id) {
            return Err(RepositoryError::Unavailable(format!(
                "lease {} references a missing space",
                lease.id.0
            )));
        }

        let lease = {
            let stored = state
                .leases
                .get_mut(id)
                .ok_or(RepositoryError::NotFound)?;
            stored.status = LeaseStatus::Terminated;
            stored.clone()
        };
        let space = {
            let stored = state
                .spaces
                .get_mut(&lease.space_id)
                .ok_or(RepositoryError::NotFound)?;
            stored.status = SpaceStatus::Available;
            stored.clone()
        };

        Ok(TerminationOutcome { lease, space })
    }

    fn hydrated_lease(&self, id: &LeaseId) -> Result<Option<HydratedLease>, RepositoryError> {
        let state = self.state()?;
        let Some(lease) = state.leases.get(id) else {
            return Ok(None);
        };
        hydrate(&state, lease).map(Some)
    }

    fn leases(&self, filter: &LeaseFilter) -> Result<Vec<HydratedLease>, RepositoryError> {
        let state = self.state()?;
        let mut matching: Vec<&Lease> = state
            .leases
            .values()
            .filter(|lease| filter.status.map_or(true, |status| lease.status == status))
            .filter(|lease| filter.space_id.map_or(true, |space| lease.space_id == space))
            .filter(|lease| {
                filter
                    .tenant_id
                    .map_or(true, |tenant| lease.tenant_id == tenant)
            })
            .collect();
        matching.sort_by_key(|lease| lease.created_at);

        matching
            .into_iter()
            .map(|lease| hydrate(&state, lease))
            .collect()
    }
}

/// In-memory identity provider standing in for the external directory.
#[derive(Default)]
pub struct MemoryAccountDirectory {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl MemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let accounts = self.guard()?;
        Ok(accounts
            .values()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    pub fn count(&self) -> Result<usize, AccountError> {
        Ok(self.guard()?.len())
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<AccountId, Account>>, AccountError> {
        self.accounts
            .lock()
            .map_err(|_| AccountError::Unavailable("directory mutex poisoned".to_string()))
    }
}

impl AccountDirectory for MemoryAccountDirectory {
    fn create(&self, account: NewAccount) -> Result<Account, AccountError> {
        let mut accounts = self.guard()?;
        if accounts
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(AccountError::EmailTaken);
        }

        let created = Account {
            id: AccountId(Uuid::new_v4()),
            email: account.email,
            password_hash: account.password_hash,
            role_id: account.role_id,
            active: true,
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    fn delete(&self, id: &AccountId) -> Result<(), AccountError> {
        let mut accounts = self.guard()?;
        accounts.remove(id);
        Ok(())
    }

    fn find(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let accounts = self.guard()?;
        Ok(accounts.get(id).cloned())
    }
}

/// Role lookup with a fixed tenant role, the usual shape for deployments
/// where roles are provisioned ahead of time.
pub struct StaticRoleDirectory {
    tenant_role: RoleId,
}

impl StaticRoleDirectory {
    pub fn new(tenant_role: RoleId) -> Self {
        Self { tenant_role }
    }
}

impl Default for StaticRoleDirectory {
    fn default() -> Self {
        Self::new(RoleId(Uuid::new_v4()))
    }
}

impl RoleDirectory for StaticRoleDirectory {
    fn tenant_role(&self) -> Result<RoleId, AccountError> {
        Ok(self.tenant_role)
    }
}
