//! Access gate
//!
//! Combines the key hasher and the entitlement store into the per-request
//! authorization decision.

use std::sync::Arc;

use metrics::counter;
use tracing::debug;

use crate::domain::access::AuthDecision;
use crate::domain::account::{Account, EntitlementStore};
use crate::domain::DomainError;
use crate::infrastructure::api_key::KeyHasher;

/// Authorizes plaintext API keys against the entitlement store
#[derive(Clone)]
pub struct AccessGate {
    store: Arc<dyn EntitlementStore>,
    hasher: KeyHasher,
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate").finish_non_exhaustive()
    }
}

impl AccessGate {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self {
            store,
            hasher: KeyHasher::new(),
        }
    }

    /// Decide whether a presented key grants access
    ///
    /// Denials are returned as values. `Err` is reserved for store failures,
    /// which must never be mistaken for a denial.
    pub async fn authorize(&self, plaintext_key: Option<&str>) -> Result<AuthDecision, DomainError> {
        let decision = match self.resolve_key(plaintext_key).await? {
            Resolved::NoKey => AuthDecision::DeniedNoKey,
            Resolved::Unknown => AuthDecision::DeniedUnknownKey,
            Resolved::Found(account) if !account.is_active() => AuthDecision::DeniedInactive,
            Resolved::Found(account) => AuthDecision::Granted {
                account_id: account.id().clone(),
                subscription_item_id: account.subscription_item_id().map(str::to_string),
            },
        };

        counter!("access_decisions_total", "decision" => decision.as_str()).increment(1);
        debug!(decision = decision.as_str(), "Access decision");

        Ok(decision)
    }

    /// Find the account bound to a key, whether or not it is active
    ///
    /// Returns `None` for absent and unknown keys alike.
    pub async fn resolve(&self, plaintext_key: Option<&str>) -> Result<Option<Account>, DomainError> {
        Ok(match self.resolve_key(plaintext_key).await? {
            Resolved::Found(account) => Some(account),
            Resolved::NoKey | Resolved::Unknown => None,
        })
    }

    async fn resolve_key(&self, plaintext_key: Option<&str>) -> Result<Resolved, DomainError> {
        let key = match plaintext_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Ok(Resolved::NoKey),
        };

        let fingerprint = self.hasher.hash(key)?;

        Ok(match self.store.lookup_by_fingerprint(&fingerprint).await? {
            Some(account) => Resolved::Found(account),
            None => Resolved::Unknown,
        })
    }
}

enum Resolved {
    NoKey,
    Unknown,
    Found(Account),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountId;
    use crate::domain::api_key::{Fingerprint, IssuedKey, KeySource};
    use crate::infrastructure::account::InMemoryEntitlementStore;
    use async_trait::async_trait;

    const KNOWN_KEY: &str = "a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1";

    async fn gate_with_known_account() -> (AccessGate, Arc<InMemoryEntitlementStore>) {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let fingerprint = KeyHasher::new().hash(KNOWN_KEY).unwrap();

        store
            .register(
                &AccountId::new("A1").unwrap(),
                &fingerprint,
                Some("si_A1".to_string()),
            )
            .await
            .unwrap();

        (AccessGate::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_empty_key_denied_no_key() {
        let (gate, _) = gate_with_known_account().await;

        assert_eq!(gate.authorize(Some("")).await.unwrap(), AuthDecision::DeniedNoKey);
        assert_eq!(gate.authorize(Some("   ")).await.unwrap(), AuthDecision::DeniedNoKey);
        assert_eq!(gate.authorize(None).await.unwrap(), AuthDecision::DeniedNoKey);
    }

    #[tokio::test]
    async fn test_unknown_key_denied() {
        let (gate, _) = gate_with_known_account().await;

        assert_eq!(
            gate.authorize(Some("unknown-plaintext")).await.unwrap(),
            AuthDecision::DeniedUnknownKey
        );
    }

    #[tokio::test]
    async fn test_known_active_key_granted() {
        let (gate, _) = gate_with_known_account().await;

        assert_eq!(
            gate.authorize(Some(KNOWN_KEY)).await.unwrap(),
            AuthDecision::Granted {
                account_id: AccountId::new("A1").unwrap(),
                subscription_item_id: Some("si_A1".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_deactivated_account_denied_inactive() {
        let (gate, store) = gate_with_known_account().await;
        let id = AccountId::new("A1").unwrap();

        store.set_active(&id, false).await.unwrap();
        assert_eq!(
            gate.authorize(Some(KNOWN_KEY)).await.unwrap(),
            AuthDecision::DeniedInactive
        );

        store.set_active(&id, true).await.unwrap();
        assert!(gate.authorize(Some(KNOWN_KEY)).await.unwrap().is_granted());
    }

    #[tokio::test]
    async fn test_resolve_ignores_active_flag() {
        let (gate, store) = gate_with_known_account().await;
        store
            .set_active(&AccountId::new("A1").unwrap(), false)
            .await
            .unwrap();

        let account = gate.resolve(Some(KNOWN_KEY)).await.unwrap().unwrap();
        assert_eq!(account.id().as_str(), "A1");
        assert!(gate.resolve(Some("other")).await.unwrap().is_none());
        assert!(gate.resolve(None).await.unwrap().is_none());
    }

    /// Store whose reads always fail
    struct UnavailableStore;

    #[async_trait]
    impl EntitlementStore for UnavailableStore {
        async fn register(
            &self,
            _: &AccountId,
            _: &Fingerprint,
            _: Option<String>,
        ) -> Result<Account, DomainError> {
            Err(DomainError::storage("unavailable"))
        }

        async fn register_issued(
            &self,
            _: &AccountId,
            _: Option<String>,
            _: &dyn KeySource,
        ) -> Result<IssuedKey, DomainError> {
            Err(DomainError::storage("unavailable"))
        }

        async fn lookup_by_fingerprint(&self, _: &Fingerprint) -> Result<Option<Account>, DomainError> {
            Err(DomainError::storage("unavailable"))
        }

        async fn get(&self, _: &AccountId) -> Result<Option<Account>, DomainError> {
            Err(DomainError::storage("unavailable"))
        }

        async fn set_active(&self, _: &AccountId, _: bool) -> Result<Account, DomainError> {
            Err(DomainError::storage("unavailable"))
        }

        async fn set_subscription_item(&self, _: &AccountId, _: &str) -> Result<Account, DomainError> {
            Err(DomainError::storage("unavailable"))
        }

        async fn contains_fingerprint(&self, _: &Fingerprint) -> Result<bool, DomainError> {
            Err(DomainError::storage("unavailable"))
        }

        async fn count(&self) -> Result<usize, DomainError> {
            Err(DomainError::storage("unavailable"))
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_not_a_denial() {
        let gate = AccessGate::new(Arc::new(UnavailableStore));

        let result = gate.authorize(Some(KNOWN_KEY)).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));

        // No key never reaches the store
        assert_eq!(gate.authorize(None).await.unwrap(), AuthDecision::DeniedNoKey);
    }
}
