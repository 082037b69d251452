use std::sync::Arc;

use tracing::warn;

use super::accounts::{AccountDirectory, AccountError, NewAccount, RoleDirectory};
use super::availability::{assess, AvailabilityReport, UnavailableReason};
use super::credentials::{CredentialError, TemporaryCredential, CREDENTIAL_DISCLAIMER};
use super::domain::{
    AccountId, AccountView, DocumentClaim, IdentityDocument, LeaseDetail, LeaseId,
    OnboardingReceipt, OnboardingRequest, ProvisioningNotice, SpaceId, ValidationError,
};
use super::repository::{
    HydratedLease, LeaseFilter, LeasingRepository, NewTenant, OnboardingCommit, RepositoryError,
};

/// Orchestrates the onboarding saga over the store, the account directory,
/// and the role lookup.
///
/// Steps 1–3 (availability read, credential generation, account creation)
/// have nothing to roll back. Steps 4–6 (document, tenant, lease, space flip)
/// are one atomic store commit; when it fails, the freshly created account is
/// the only side effect left standing and is deleted before the failure is
/// surfaced.
pub struct LeaseOnboardingService<S, A, R> {
    store: Arc<S>,
    accounts: Arc<A>,
    roles: Arc<R>,
}

impl<S, A, R> LeaseOnboardingService<S, A, R>
where
    S: LeasingRepository + 'static,
    A: AccountDirectory + 'static,
    R: RoleDirectory + 'static,
{
    pub fn new(store: Arc<S>, accounts: Arc<A>, roles: Arc<R>) -> Self {
        Self {
            store,
            accounts,
            roles,
        }
    }

    /// Pure availability check for a space. No side effects.
    pub fn check_space(&self, id: &SpaceId) -> Result<AvailabilityReport, OnboardingError> {
        let space = self
            .store
            .space(id)?
            .ok_or(OnboardingError::SpaceNotFound)?;
        let active = self.store.active_lease_for_space(id)?;
        Ok(assess(&space, active.as_ref()))
    }

    /// Find-or-create an identity document outside of an onboarding.
    pub fn resolve_document(
        &self,
        claim: &DocumentClaim,
    ) -> Result<IdentityDocument, OnboardingError> {
        Ok(self.store.resolve_document(claim)?)
    }

    /// Run the full onboarding saga and return the hydrated lease together
    /// with the one-time provisioning notice.
    pub fn onboard(
        &self,
        request: OnboardingRequest,
    ) -> Result<OnboardingReceipt, OnboardingError> {
        request.validate()?;

        let (space, _space_type) = self
            .store
            .space_with_type(&request.space_id)?
            .ok_or(OnboardingError::SpaceNotFound)?;
        let active = self.store.active_lease_for_space(&request.space_id)?;
        let report = assess(&space, active.as_ref());
        if let Some(reason) = report.reason {
            return Err(OnboardingError::SpaceUnavailable {
                code: space.code.clone(),
                reason,
            });
        }

        let credential = TemporaryCredential::generate();
        let password_hash = credential.hash()?;
        let role_id = self.roles.tenant_role()?;
        let account = self.accounts.create(NewAccount {
            email: request.tenant.email.clone(),
            password_hash,
            role_id,
        })?;

        let commit = OnboardingCommit {
            space_id: request.space_id,
            tenant: NewTenant {
                intake: request.tenant,
                account_id: account.id,
                registered_by: request.registered_by,
            },
            lease: request.lease,
        };
        let outcome = match self.store.commit_onboarding(commit) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.release_account(&account.id);
                return Err(err.into());
            }
        };

        let hydrated = self
            .store
            .hydrated_lease(&outcome.lease.id)?
            .ok_or_else(|| {
                OnboardingError::Repository(RepositoryError::Unavailable(
                    "onboarded lease missing on re-read".to_string(),
                ))
            })?;

        let provisioning = ProvisioningNotice {
            account_email: account.email.clone(),
            temporary_credential: credential.into_secret(),
            disclaimer: CREDENTIAL_DISCLAIMER.to_string(),
            space_status_before: outcome.space_status_before,
            space_status_after: outcome.space_status_after,
        };

        Ok(OnboardingReceipt {
            lease: self.detail(hydrated, Some(AccountView::from(&account))),
            provisioning,
        })
    }

    /// Hydrated find-by-id.
    pub fn lease(&self, id: &LeaseId) -> Result<LeaseDetail, OnboardingError> {
        let hydrated = self
            .store
            .hydrated_lease(id)?
            .ok_or(OnboardingError::LeaseNotFound)?;
        self.attach_account(hydrated)
    }

    /// List leases matching `filter`, hydrated.
    pub fn leases(&self, filter: &LeaseFilter) -> Result<Vec<LeaseDetail>, OnboardingError> {
        self.store
            .leases(filter)?
            .into_iter()
            .map(|hydrated| self.attach_account(hydrated))
            .collect()
    }

    /// Set the lease TERMINATED and release its space back to AVAILABLE, the
    /// exact inverse of onboarding's state transition.
    pub fn terminate(&self, id: &LeaseId) -> Result<LeaseDetail, OnboardingError> {
        let outcome = self.store.terminate_lease(id).map_err(|err| match err {
            RepositoryError::NotFound => OnboardingError::LeaseNotFound,
            other => OnboardingError::Repository(other),
        })?;

        let hydrated = self
            .store
            .hydrated_lease(&outcome.lease.id)?
            .ok_or(OnboardingError::LeaseNotFound)?;
        self.attach_account(hydrated)
    }

    fn attach_account(&self, hydrated: HydratedLease) -> Result<LeaseDetail, OnboardingError> {
        let account = match hydrated.tenant.account_id {
            Some(account_id) => self
                .accounts
                .find(&account_id)?
                .map(|account| AccountView::from(&account)),
            None => None,
        };
        Ok(self.detail(hydrated, account))
    }

    fn detail(&self, hydrated: HydratedLease, account: Option<AccountView>) -> LeaseDetail {
        LeaseDetail {
            lease: hydrated.lease,
            tenant: hydrated.tenant,
            document: hydrated.document,
            account,
            space: hydrated.space,
            space_type: hydrated.space_type,
        }
    }

    /// Compensation for the one side effect outside the store transaction.
    /// Deletion is idempotent, so a concurrent retry cannot turn the rollback
    /// itself into a failure.
    fn release_account(&self, id: &AccountId) {
        if let Err(err) = self.accounts.delete(id) {
            warn!(account_id = %id.0, error = %err, "failed to release account after onboarding rollback");
        }
    }
}

/// Error raised by the onboarding service.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("space not found")]
    SpaceNotFound,
    #[error("lease not found")]
    LeaseNotFound,
    #[error("space '{code}' is not available: {reason}")]
    SpaceUnavailable {
        code: String,
        reason: UnavailableReason,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl OnboardingError {
    /// Collapse the error into the transport-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SpaceNotFound | Self::LeaseNotFound => ErrorKind::NotFound,
            Self::SpaceUnavailable { .. } => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Account(AccountError::EmailTaken) => ErrorKind::Conflict,
            Self::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            Self::Repository(RepositoryError::Conflict(_)) => ErrorKind::Conflict,
            Self::Credential(_)
            | Self::Account(_)
            | Self::Repository(RepositoryError::Unavailable(_)) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Internal,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}
