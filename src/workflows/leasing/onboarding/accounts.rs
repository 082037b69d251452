use super::domain::{Account, AccountId, RoleId};

/// Fields required to provision a login account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub role_id: RoleId,
}

/// Capability boundary for the identity provider holding login accounts.
/// Creation here is the one onboarding side effect that may live outside the
/// store transaction, which is why `delete` must be idempotent: it is the
/// compensation the orchestrator runs when a later step fails.
pub trait AccountDirectory: Send + Sync {
    /// Persist a new account. Fails with [`AccountError::EmailTaken`] when
    /// the email is already registered.
    fn create(&self, account: NewAccount) -> Result<Account, AccountError>;

    /// Remove an account. Must succeed when the account is already gone so a
    /// concurrent retry of the compensation cannot fail.
    fn delete(&self, id: &AccountId) -> Result<(), AccountError>;

    fn find(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;
}

/// Resolves the role newly onboarded tenants are enrolled under.
pub trait RoleDirectory: Send + Sync {
    fn tenant_role(&self) -> Result<RoleId, AccountError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("email is already registered")]
    EmailTaken,
    #[error("tenant role is not provisioned")]
    RoleMissing,
    #[error("account directory unavailable: {0}")]
    Unavailable(String),
}
