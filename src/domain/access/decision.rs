//! Authorization decision

use serde::Serialize;

use crate::domain::account::AccountId;

/// Outcome of checking a presented API key
///
/// Denials are ordinary values, not errors, so callers can map each one to a
/// distinct response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AuthDecision {
    /// Key is bound to an active account
    Granted {
        account_id: AccountId,
        subscription_item_id: Option<String>,
    },
    /// No key was presented
    DeniedNoKey,
    /// Key does not match any registered fingerprint
    DeniedUnknownKey,
    /// Key matches an account that is not active
    DeniedInactive,
}

impl AuthDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted { .. } => "granted",
            Self::DeniedNoKey => "denied_no_key",
            Self::DeniedUnknownKey => "denied_unknown_key",
            Self::DeniedInactive => "denied_inactive",
        }
    }
}

impl std::fmt::Display for AuthDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_granted_is_granted() {
        let granted = AuthDecision::Granted {
            account_id: AccountId::new("cus_1").unwrap(),
            subscription_item_id: None,
        };

        assert!(granted.is_granted());
        assert!(!AuthDecision::DeniedNoKey.is_granted());
        assert!(!AuthDecision::DeniedUnknownKey.is_granted());
        assert!(!AuthDecision::DeniedInactive.is_granted());
    }

    #[test]
    fn test_labels_are_distinct() {
        let labels = [
            AuthDecision::DeniedNoKey.as_str(),
            AuthDecision::DeniedUnknownKey.as_str(),
            AuthDecision::DeniedInactive.as_str(),
        ];

        assert_eq!(labels, ["denied_no_key", "denied_unknown_key", "denied_inactive"]);
    }

    #[test]
    fn test_serialization() {
        let granted = AuthDecision::Granted {
            account_id: AccountId::new("cus_1").unwrap(),
            subscription_item_id: Some("si_1".to_string()),
        };
        let json = serde_json::to_value(&granted).unwrap();

        assert_eq!(json["decision"], "granted");
        assert_eq!(json["account_id"], "cus_1");
        assert_eq!(json["subscription_item_id"], "si_1");
    }
}
