//! Account entity and identifier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_account_id, AccountValidationError};
use crate::domain::api_key::Fingerprint;

/// Provider-assigned account identifier (the billing provider's customer id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Create a new AccountId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, AccountValidationError> {
        let id = id.into();
        validate_account_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A paying account bound to exactly one key fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    key_fingerprint: Fingerprint,
    active: bool,
    /// Metered line item used when emitting usage records
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription_item_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Create an account at purchase completion (active)
    pub fn new(id: AccountId, key_fingerprint: Fingerprint) -> Self {
        let now = Utc::now();

        Self {
            id,
            key_fingerprint,
            active: true,
            subscription_item_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the metered subscription item
    pub fn with_subscription_item(mut self, item_id: impl Into<String>) -> Self {
        self.subscription_item_id = Some(item_id.into());
        self
    }

    /// Set the initial active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    // Getters

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn key_fingerprint(&self) -> &Fingerprint {
        &self.key_fingerprint
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn subscription_item_id(&self) -> Option<&str> {
        self.subscription_item_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Set the active flag
    ///
    /// Returns whether the value changed. Setting the current value again
    /// leaves the record untouched.
    pub fn set_active(&mut self, active: bool) -> bool {
        if self.active == active {
            return false;
        }

        self.active = active;
        self.touch();
        true
    }

    /// Attach or replace the metered subscription item
    pub fn set_subscription_item(&mut self, item_id: impl Into<String>) {
        self.subscription_item_id = Some(item_id.into());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
