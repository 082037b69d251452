use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::workflows::leasing::onboarding::domain::{
    ActorId, DocumentClaim, DocumentKind, LeaseTerms, OnboardingRequest, Space, SpaceId,
    SpaceStatus, SpaceType, SpaceTypeId, TenantIntake,
};
use crate::workflows::leasing::onboarding::memory::{
    MemoryAccountDirectory, MemoryLeasingStore, StaticRoleDirectory,
};
use crate::workflows::leasing::onboarding::repository::{
    HydratedLease, LeaseFilter, LeasingRepository, OnboardingCommit, OnboardingOutcome,
    RepositoryError, TerminationOutcome,
};
use crate::workflows::leasing::onboarding::service::LeaseOnboardingService;
use crate::workflows::leasing::onboarding::{IdentityDocument, Lease, LeaseId};

pub(super) type MemoryService =
    LeaseOnboardingService<MemoryLeasingStore, MemoryAccountDirectory, StaticRoleDirectory>;

pub(super) fn space_type() -> SpaceType {
    SpaceType {
        id: SpaceTypeId(Uuid::new_v4()),
        name: "Apartment".to_string(),
    }
}

pub(super) fn available_space(space_type: &SpaceType, code: &str) -> Space {
    Space {
        id: SpaceId(Uuid::new_v4()),
        code: code.to_string(),
        space_type_id: space_type.id,
        status: SpaceStatus::Available,
        active: true,
    }
}

/// Store with one available space, `ESP-001`.
pub(super) fn seeded_store() -> (Arc<MemoryLeasingStore>, Space) {
    let store = Arc::new(MemoryLeasingStore::new());
    let space_type = space_type();
    let space = available_space(&space_type, "ESP-001");
    store
        .insert_space_type(space_type)
        .expect("seed space type");
    store.insert_space(space.clone()).expect("seed space");
    (store, space)
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<MemoryLeasingStore>,
    Arc<MemoryAccountDirectory>,
    Space,
) {
    let (store, space) = seeded_store();
    let accounts = Arc::new(MemoryAccountDirectory::new());
    let roles = Arc::new(StaticRoleDirectory::default());
    let service = LeaseOnboardingService::new(store.clone(), accounts.clone(), roles);
    (service, store, accounts, space)
}

pub(super) fn request(space_id: SpaceId) -> OnboardingRequest {
    OnboardingRequest {
        space_id,
        tenant: TenantIntake {
            full_name: "Juan Pérez".to_string(),
            email: "juan@example.com".to_string(),
            document: DocumentClaim {
                kind: DocumentKind::NationalId,
                number: "12345678".to_string(),
            },
            phone: Some("+51 999 111 222".to_string()),
            address: Some("Av. Los Álamos 120".to_string()),
            occupation: Some("Accountant".to_string()),
            declared_monthly_income: Some(2400),
            vehicle_plate: None,
        },
        lease: LeaseTerms {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            end_date: Some(NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date")),
            monthly_amount: 500,
            deposit: Some(500),
            notes: None,
        },
        registered_by: ActorId(Uuid::new_v4()),
    }
}

pub(super) fn request_with(
    space_id: SpaceId,
    email: &str,
    document_number: &str,
) -> OnboardingRequest {
    let mut request = request(space_id);
    request.tenant.email = email.to_string();
    request.tenant.document.number = document_number.to_string();
    request
}

/// Store double whose reads succeed but whose commit always fails, standing
/// in for a persistence outage between the availability read and the write.
pub(super) struct CommitFailsStore {
    pub(super) inner: MemoryLeasingStore,
}

impl LeasingRepository for CommitFailsStore {
    fn space(&self, id: &SpaceId) -> Result<Option<Space>, RepositoryError> {
        self.inner.space(id)
    }

    fn space_with_type(
        &self,
        id: &SpaceId,
    ) -> Result<Option<(Space, SpaceType)>, RepositoryError> {
        self.inner.space_with_type(id)
    }

    fn active_lease_for_space(&self, id: &SpaceId) -> Result<Option<Lease>, RepositoryError> {
        self.inner.active_lease_for_space(id)
    }

    fn resolve_document(
        &self,
        claim: &DocumentClaim,
    ) -> Result<IdentityDocument, RepositoryError> {
        self.inner.resolve_document(claim)
    }

    fn commit_onboarding(
        &self,
        _commit: OnboardingCommit,
    ) -> Result<OnboardingOutcome, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn terminate_lease(&self, id: &LeaseId) -> Result<TerminationOutcome, RepositoryError> {
        self.inner.terminate_lease(id)
    }

    fn hydrated_lease(&self, id: &LeaseId) -> Result<Option<HydratedLease>, RepositoryError> {
        self.inner.hydrated_lease(id)
    }

    fn leases(&self, filter: &LeaseFilter) -> Result<Vec<HydratedLease>, RepositoryError> {
        self.inner.leases(filter)
    }
}
