use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for leasable spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpaceId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpaceTypeId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaseId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(pub Uuid);

/// Identifier of the staff member recorded as having registered a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceStatus {
    Available,
    Occupied,
    Maintenance,
    Retired,
}

impl SpaceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
            Self::Retired => "retired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceType {
    pub id: SpaceTypeId,
    pub name: String,
}

/// A leasable unit. At most one ACTIVE lease may reference a space; `status`
/// mirrors that fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    pub code: String,
    pub space_type_id: SpaceTypeId,
    pub status: SpaceStatus,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    NationalId,
    Passport,
    DriverLicense,
    TaxId,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NationalId => "national_id",
            Self::Passport => "passport",
            Self::DriverLicense => "driver_license",
            Self::TaxId => "tax_id",
        }
    }
}

/// Identity record shared by registered parties. `number` is globally unique;
/// a row is created once per (kind, number) and reused while not bound to an
/// active tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDocument {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub number: String,
}

/// Document fields supplied at intake, before resolution against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentClaim {
    pub kind: DocumentKind,
    pub number: String,
}

/// Login account provisioned for a tenant. Only the hash of the one-time
/// credential is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: RoleId,
    pub active: bool,
}

/// Account fields exposed on read surfaces; never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub email: String,
    pub role_id: RoleId,
    pub active: bool,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            role_id: account.role_id,
            active: account.active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub declared_monthly_income: Option<u32>,
    pub vehicle_plate: Option<String>,
    pub document_id: DocumentId,
    pub account_id: Option<AccountId>,
    pub verified: bool,
    pub active: bool,
    pub registered_by: ActorId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Active,
    Terminated,
}

impl LeaseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Terminated => "terminated",
        }
    }
}

/// Time-bounded right of a tenant to occupy a space for a monthly amount.
/// `Terminated` is terminal; there is no way back to `Active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    pub tenant_id: TenantId,
    pub space_id: SpaceId,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub monthly_amount: u32,
    pub deposit: Option<u32>,
    pub status: LeaseStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tenant profile fields collected by the onboarding entry point. Email and
/// the identity document are required; the rest is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantIntake {
    pub full_name: String,
    pub email: String,
    pub document: DocumentClaim,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub declared_monthly_income: Option<u32>,
    #[serde(default)]
    pub vehicle_plate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseTerms {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub monthly_amount: u32,
    #[serde(default)]
    pub deposit: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Single entry point payload for the onboarding saga.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingRequest {
    pub space_id: SpaceId,
    pub tenant: TenantIntake,
    pub lease: LeaseTerms,
    pub registered_by: ActorId,
}

impl OnboardingRequest {
    /// Rejects malformed input before any side effect is attempted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tenant.full_name.trim().is_empty() {
            return Err(ValidationError::MissingFullName);
        }
        if self.tenant.email.trim().is_empty() || !self.tenant.email.contains('@') {
            return Err(ValidationError::InvalidEmail(self.tenant.email.clone()));
        }
        if self.tenant.document.number.trim().is_empty() {
            return Err(ValidationError::MissingDocumentNumber);
        }
        if let Some(end) = self.lease.end_date {
            if end <= self.lease.start_date {
                return Err(ValidationError::EndBeforeStart {
                    start: self.lease.start_date,
                    end,
                });
            }
        }
        if self.lease.monthly_amount == 0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        if self.lease.deposit == Some(0) {
            return Err(ValidationError::NonPositiveDeposit);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("tenant full name is required")]
    MissingFullName,
    #[error("tenant email '{0}' is not a valid address")]
    InvalidEmail(String),
    #[error("identity document number is required")]
    MissingDocumentNumber,
    #[error("lease end date {end} must fall after the start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("monthly amount must be greater than zero")]
    NonPositiveAmount,
    #[error("deposit must be greater than zero when provided")]
    NonPositiveDeposit,
}

/// Fully hydrated lease returned by the read surfaces and by a successful
/// onboarding: tenant with its document and account view, space with its type.
#[derive(Debug, Clone, Serialize)]
pub struct LeaseDetail {
    pub lease: Lease,
    pub tenant: Tenant,
    pub document: IdentityDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountView>,
    pub space: Space,
    pub space_type: SpaceType,
}

/// One-time operator-facing block accompanying a successful onboarding. The
/// plaintext credential is surfaced here exactly once and never persisted.
#[derive(Clone, Serialize)]
pub struct ProvisioningNotice {
    pub account_email: String,
    pub temporary_credential: String,
    pub disclaimer: String,
    pub space_status_before: SpaceStatus,
    pub space_status_after: SpaceStatus,
}

impl std::fmt::Debug for ProvisioningNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningNotice")
            .field("account_email", &self.account_email)
            .field("temporary_credential", &"<redacted>")
            .field("space_status_before", &self.space_status_before)
            .field("space_status_after", &self.space_status_after)
            .finish()
    }
}

/// Success payload of the onboarding saga.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingReceipt {
    pub lease: LeaseDetail,
    pub provisioning: ProvisioningNotice,
}
