//! Entitlement store trait

use async_trait::async_trait;

use super::entity::{Account, AccountId};
use crate::domain::api_key::{Fingerprint, IssuedKey, KeySource};
use crate::domain::DomainError;

/// Owner of all account records and the fingerprint index
///
/// Implementations must keep fingerprint -> account a total function: a
/// failed registration leaves existing state untouched.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Bind a fingerprint to a new, active account
    ///
    /// Fails with `DuplicateFingerprint` if the fingerprint is bound to any
    /// account and with `DuplicateAccount` if the account already has one.
    async fn register(
        &self,
        account_id: &AccountId,
        fingerprint: &Fingerprint,
        subscription_item_id: Option<String>,
    ) -> Result<Account, DomainError>;

    /// Issue a key from `keys` and register it in one exclusive step
    async fn register_issued(
        &self,
        account_id: &AccountId,
        subscription_item_id: Option<String>,
        keys: &dyn KeySource,
    ) -> Result<IssuedKey, DomainError>;

    /// Look up the account bound to a fingerprint
    async fn lookup_by_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<Account>, DomainError>;

    /// Get an account by its ID
    async fn get(&self, account_id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Set the active flag (idempotent)
    async fn set_active(&self, account_id: &AccountId, active: bool)
        -> Result<Account, DomainError>;

    /// Attach the metered subscription item to an account
    async fn set_subscription_item(
        &self,
        account_id: &AccountId,
        item_id: &str,
    ) -> Result<Account, DomainError>;

    /// Check whether a fingerprint is already bound
    async fn contains_fingerprint(&self, fingerprint: &Fingerprint) -> Result<bool, DomainError>;

    /// Number of registered accounts
    async fn count(&self) -> Result<usize, DomainError>;
}
