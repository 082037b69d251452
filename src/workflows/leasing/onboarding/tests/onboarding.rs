use std::sync::Arc;

use chrono::NaiveDate;

use super::common::{
    available_space, build_service, request, request_with, space_type, CommitFailsStore,
};
use crate::workflows::leasing::onboarding::accounts::{AccountDirectory, AccountError, NewAccount};
use crate::workflows::leasing::onboarding::availability::UnavailableReason;
use crate::workflows::leasing::onboarding::credentials::verify_credential;
use crate::workflows::leasing::onboarding::domain::{
    DocumentClaim, DocumentKind, RoleId, SpaceStatus, ValidationError,
};
use crate::workflows::leasing::onboarding::memory::{
    MemoryAccountDirectory, MemoryLeasingStore, StaticRoleDirectory,
};
use crate::workflows::leasing::onboarding::repository::{
    ConflictCause, LeaseFilter, LeasingRepository, RepositoryError,
};
use crate::workflows::leasing::onboarding::service::{
    ErrorKind, LeaseOnboardingService, OnboardingError,
};
use crate::workflows::leasing::onboarding::LeaseStatus;
use uuid::Uuid;

#[test]
fn successful_onboarding_creates_lease_and_occupies_space() {
    let (service, store, accounts, space) = build_service();

    let receipt = service.onboard(request(space.id)).expect("onboarding succeeds");

    let detail = &receipt.lease;
    assert_eq!(detail.lease.status, LeaseStatus::Active);
    assert_eq!(detail.space.id, space.id);
    assert_eq!(detail.tenant.email, "juan@example.com");
    assert_eq!(detail.document.number, "12345678");
    assert!(!detail.tenant.verified);

    let stored = store
        .space(&space.id)
        .expect("space read")
        .expect("space present");
    assert_eq!(stored.status, SpaceStatus::Occupied);

    let notice = &receipt.provisioning;
    assert_eq!(notice.space_status_before, SpaceStatus::Available);
    assert_eq!(notice.space_status_after, SpaceStatus::Occupied);
    assert!(notice.temporary_credential.len() >= 12);

    // The account stores the hash of the one-time secret, never the secret.
    let account = accounts
        .find_by_email("juan@example.com")
        .expect("directory read")
        .expect("account present");
    assert_ne!(account.password_hash, notice.temporary_credential);
    assert!(
        verify_credential(&notice.temporary_credential, &account.password_hash)
            .expect("hash parses")
    );
}

#[test]
fn second_onboarding_on_same_space_fails_before_any_write() {
    let (service, store, accounts, space) = build_service();
    service.onboard(request(space.id)).expect("first onboarding");

    let result = service.onboard(request_with(space.id, "maria@example.com", "87654321"));
    match result {
        Err(OnboardingError::SpaceUnavailable { reason, .. }) => {
            assert_eq!(reason, UnavailableReason::NotOpenForLease);
        }
        other => panic!("expected unavailable space, got {other:?}"),
    }

    // Nothing from the rejected attempt persisted.
    assert_eq!(accounts.count().expect("count"), 1);
    let leases = store
        .leases(&LeaseFilter {
            space_id: Some(space.id),
            ..LeaseFilter::default()
        })
        .expect("lease list");
    assert_eq!(leases.len(), 1);
    let stored = store
        .space(&space.id)
        .expect("space read")
        .expect("space present");
    assert_eq!(stored.status, SpaceStatus::Occupied);
}

#[test]
fn document_bound_to_active_tenant_is_a_conflict_and_account_is_rolled_back() {
    let (service, store, accounts, space) = build_service();
    service.onboard(request(space.id)).expect("first onboarding");

    let second_type = space_type();
    let second_space = available_space(&second_type, "ESP-002");
    store.insert_space_type(second_type).expect("seed type");
    store.insert_space(second_space.clone()).expect("seed space");

    // Different tenant reusing the document number already bound to the
    // first, still-active tenant.
    let result = service.onboard(request_with(second_space.id, "maria@example.com", "12345678"));
    match result {
        Err(OnboardingError::Repository(RepositoryError::Conflict(cause))) => {
            assert_eq!(cause, ConflictCause::DocumentBound);
        }
        other => panic!("expected document conflict, got {other:?}"),
    }

    // The provisioned account was compensated away and nothing else moved.
    assert!(accounts
        .find_by_email("maria@example.com")
        .expect("directory read")
        .is_none());
    assert_eq!(accounts.count().expect("count"), 1);
    let leases = store
        .leases(&LeaseFilter {
            space_id: Some(second_space.id),
            ..LeaseFilter::default()
        })
        .expect("lease list");
    assert!(leases.is_empty());
    let stored = store
        .space(&second_space.id)
        .expect("space read")
        .expect("space present");
    assert_eq!(stored.status, SpaceStatus::Available);
}

#[test]
fn commit_failure_rolls_back_the_provisioned_account() {
    let space_type = space_type();
    let space = available_space(&space_type, "ESP-001");
    let inner = MemoryLeasingStore::new();
    inner.insert_space_type(space_type).expect("seed type");
    inner.insert_space(space.clone()).expect("seed space");

    let store = Arc::new(CommitFailsStore { inner });
    let accounts = Arc::new(MemoryAccountDirectory::new());
    let service = LeaseOnboardingService::new(
        store.clone(),
        accounts.clone(),
        Arc::new(StaticRoleDirectory::default()),
    );

    let result = service.onboard(request(space.id));
    match result {
        Err(OnboardingError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable repository, got {other:?}"),
    }

    assert_eq!(accounts.count().expect("count"), 0);
    let stored = store
        .inner
        .space(&space.id)
        .expect("space read")
        .expect("space present");
    assert_eq!(stored.status, SpaceStatus::Available);
    assert!(store
        .inner
        .leases(&LeaseFilter::default())
        .expect("lease list")
        .is_empty());
}

#[test]
fn registered_email_is_a_conflict_and_nothing_persists() {
    let (service, store, accounts, space) = build_service();
    accounts
        .create(NewAccount {
            email: "juan@example.com".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role_id: RoleId(Uuid::new_v4()),
        })
        .expect("pre-registered account");

    let result = service.onboard(request(space.id));
    match &result {
        Err(err @ OnboardingError::Account(AccountError::EmailTaken)) => {
            assert_eq!(err.kind(), ErrorKind::Conflict);
        }
        other => panic!("expected email conflict, got {other:?}"),
    }

    assert_eq!(accounts.count().expect("count"), 1);
    let stored = store
        .space(&space.id)
        .expect("space read")
        .expect("space present");
    assert_eq!(stored.status, SpaceStatus::Available);
    assert!(store
        .leases(&LeaseFilter::default())
        .expect("lease list")
        .is_empty());
}

#[test]
fn resolve_document_is_idempotent_before_binding() {
    let (service, _, _, _) = build_service();
    let claim = DocumentClaim {
        kind: DocumentKind::NationalId,
        number: "40302010".to_string(),
    };

    let first = service.resolve_document(&claim).expect("first resolve");
    let second = service.resolve_document(&claim).expect("second resolve");
    assert_eq!(first.id, second.id);
}

#[test]
fn malformed_date_range_is_rejected_before_any_side_effect() {
    let (service, _, accounts, space) = build_service();
    let mut bad = request(space.id);
    bad.lease.end_date = Some(NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"));

    let result = service.onboard(bad);
    match result {
        Err(OnboardingError::Validation(ValidationError::EndBeforeStart { .. })) => {}
        other => panic!("expected date-range validation failure, got {other:?}"),
    }
    assert_eq!(accounts.count().expect("count"), 0);
}

#[test]
fn non_positive_monetary_fields_are_rejected() {
    let (service, _, _, space) = build_service();

    let mut zero_rent = request(space.id);
    zero_rent.lease.monthly_amount = 0;
    assert!(matches!(
        service.onboard(zero_rent),
        Err(OnboardingError::Validation(
            ValidationError::NonPositiveAmount
        ))
    ));

    let mut zero_deposit = request(space.id);
    zero_deposit.lease.deposit = Some(0);
    assert!(matches!(
        service.onboard(zero_deposit),
        Err(OnboardingError::Validation(
            ValidationError::NonPositiveDeposit
        ))
    ));
}

#[test]
fn invalid_email_is_rejected() {
    let (service, _, _, space) = build_service();
    let mut bad = request(space.id);
    bad.tenant.email = "not-an-address".to_string();
    assert!(matches!(
        service.onboard(bad),
        Err(OnboardingError::Validation(ValidationError::InvalidEmail(_)))
    ));
}
