//! Account storage trait.

use thiserror::Error;

use super::{AccountKind, AccountUpdate, ExternalAccount, NewAccount};

/// Error type for account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Account not found (or owned by another tenant).
    #[error("Account not found: {0}")]
    NotFound(i64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for account storage backends.
///
/// Implementations must uphold the default-flag invariant: at most one
/// account per (tenant, kind) carries the default flag, and every mutation
/// that could break that re-establishes it.
pub trait AccountStore: Send + Sync {
    /// Create a new account. The first account of its kind for a tenant
    /// becomes the default automatically.
    fn create(&self, account: NewAccount) -> Result<ExternalAccount, AccountError>;

    /// Get an account by id, scoped to a tenant.
    fn get(&self, tenant_id: i64, id: i64) -> Result<Option<ExternalAccount>, AccountError>;

    /// List a tenant's accounts, optionally filtered by kind, ordered by name.
    fn list(
        &self,
        tenant_id: i64,
        kind: Option<AccountKind>,
    ) -> Result<Vec<ExternalAccount>, AccountError>;

    /// Update an account's editable fields.
    fn update(
        &self,
        tenant_id: i64,
        id: i64,
        update: AccountUpdate,
    ) -> Result<ExternalAccount, AccountError>;

    /// Delete an account. If it was the default, promotes an arbitrary
    /// remaining account of the same kind. Returns the deleted account.
    fn delete(&self, tenant_id: i64, id: i64) -> Result<ExternalAccount, AccountError>;

    /// Flag an account as the tenant's default for its kind, clearing the
    /// flag from any other account of that kind in the same transaction.
    fn set_default(&self, tenant_id: i64, id: i64) -> Result<ExternalAccount, AccountError>;

    /// Resolve the account to use for a tenant and kind: the default-flagged
    /// one, else an arbitrary first-found, else `None`. An absent account is
    /// a user-correctable configuration gap, not a system fault.
    fn active_account(
        &self,
        tenant_id: i64,
        kind: AccountKind,
    ) -> Result<Option<ExternalAccount>, AccountError>;
}
