//! In-memory entitlement store implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::account::{Account, AccountId, EntitlementStore};
use crate::domain::api_key::{Fingerprint, IssuedKey, KeySource};
use crate::domain::DomainError;

/// Both maps live behind one lock so readers never see an account without
/// its index entry or the reverse.
#[derive(Debug, Default)]
struct Entitlements {
    accounts: HashMap<AccountId, Account>,
    fingerprint_index: HashMap<Fingerprint, AccountId>,
}

impl Entitlements {
    fn check_free(&self, account_id: &AccountId, fingerprint: &Fingerprint) -> Result<(), DomainError> {
        if self.accounts.contains_key(account_id) {
            return Err(DomainError::duplicate_account(account_id.as_str()));
        }

        if self.fingerprint_index.contains_key(fingerprint) {
            return Err(DomainError::duplicate_fingerprint(fingerprint.as_str()));
        }

        Ok(())
    }

    fn insert(&mut self, account: Account) -> Account {
        self.fingerprint_index
            .insert(account.key_fingerprint().clone(), account.id().clone());
        self.accounts.insert(account.id().clone(), account.clone());
        account
    }

    fn get_mut(&mut self, account_id: &AccountId) -> Result<&mut Account, DomainError> {
        self.accounts
            .get_mut(account_id)
            .ok_or_else(|| DomainError::not_found(format!("Account '{}' not found", account_id)))
    }
}

/// In-memory implementation of EntitlementStore
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntitlementStore {
    inner: Arc<RwLock<Entitlements>>,
}

impl InMemoryEntitlementStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with accounts
    ///
    /// Fails if two seeds share an account ID or a fingerprint.
    pub fn with_accounts(accounts: Vec<Account>) -> Result<Self, DomainError> {
        let mut entitlements = Entitlements::default();

        for account in accounts {
            entitlements.check_free(account.id(), account.key_fingerprint())?;
            entitlements.insert(account);
        }

        Ok(Self {
            inner: Arc::new(RwLock::new(entitlements)),
        })
    }
}

#[async_trait]
impl EntitlementStore for InMemoryEntitlementStore {
    async fn register(
        &self,
        account_id: &AccountId,
        fingerprint: &Fingerprint,
        subscription_item_id: Option<String>,
    ) -> Result<Account, DomainError> {
        let mut inner = self.inner.write().await;
        inner.check_free(account_id, fingerprint)?;

        let mut account = Account::new(account_id.clone(), fingerprint.clone());
        if let Some(item_id) = subscription_item_id {
            account = account.with_subscription_item(item_id);
        }

        info!(account_id = %account_id, "Registered key binding");
        Ok(inner.insert(account))
    }

    async fn register_issued(
        &self,
        account_id: &AccountId,
        subscription_item_id: Option<String>,
        keys: &dyn KeySource,
    ) -> Result<IssuedKey, DomainError> {
        let mut inner = self.inner.write().await;

        if inner.accounts.contains_key(account_id) {
            return Err(DomainError::duplicate_account(account_id.as_str()));
        }

        let issued = keys.issue(&|fp| inner.fingerprint_index.contains_key(fp));

        let mut account = Account::new(account_id.clone(), issued.fingerprint.clone());
        if let Some(item_id) = subscription_item_id {
            account = account.with_subscription_item(item_id);
        }
        inner.insert(account);

        info!(account_id = %account_id, "Issued and registered API key");
        Ok(issued)
    }

    async fn lookup_by_fingerprint(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<Account>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .fingerprint_index
            .get(fingerprint)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn get(&self, account_id: &AccountId) -> Result<Option<Account>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.get(account_id).cloned())
    }

    async fn set_active(
        &self,
        account_id: &AccountId,
        active: bool,
    ) -> Result<Account, DomainError> {
        let mut inner = self.inner.write().await;
        let account = inner.get_mut(account_id)?;

        if account.set_active(active) {
            info!(account_id = %account_id, active, "Account entitlement changed");
        } else {
            debug!(account_id = %account_id, active, "Account entitlement unchanged");
        }

        Ok(account.clone())
    }

    async fn set_subscription_item(
        &self,
        account_id: &AccountId,
        item_id: &str,
    ) -> Result<Account, DomainError> {
        let mut inner = self.inner.write().await;
        let account = inner.get_mut(account_id)?;

        account.set_subscription_item(item_id);
        Ok(account.clone())
    }

    async fn contains_fingerprint(&self, fingerprint: &Fingerprint) -> Result<bool, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.fingerprint_index.contains_key(fingerprint))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.len())
    }
}
