//! Usage reporter - Emits one usage record per granted request

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use crate::domain::account::AccountId;
use crate::domain::billing::{BillingProviderClient, UsageRecord};

/// Outcome of a single usage emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageOutcome {
    Recorded,
    Failed,
    TimedOut,
}

impl UsageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Best-effort, at-most-once usage emission
///
/// Runs after a `Granted` decision. Its outcome is reported, never
/// propagated: the request it meters has already succeeded.
pub struct UsageReporter {
    billing: Arc<dyn BillingProviderClient>,
    timeout: Duration,
}

impl UsageReporter {
    pub fn new(billing: Arc<dyn BillingProviderClient>, timeout: Duration) -> Self {
        Self { billing, timeout }
    }

    /// Emit exactly one usage record for a granted request
    pub async fn report(
        &self,
        account_id: &AccountId,
        subscription_item_id: Option<&str>,
    ) -> UsageOutcome {
        let record = UsageRecord::single(
            account_id.clone(),
            subscription_item_id.map(str::to_string),
        );

        let outcome = match tokio::time::timeout(self.timeout, self.billing.emit_usage(&record)).await
        {
            Ok(Ok(())) => {
                debug!(account_id = %account_id, "Usage recorded");
                UsageOutcome::Recorded
            }
            Ok(Err(e)) => {
                warn!(account_id = %account_id, error = %e, "Failed to record usage");
                UsageOutcome::Failed
            }
            Err(_) => {
                warn!(
                    account_id = %account_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Usage emission timed out"
                );
                UsageOutcome::TimedOut
            }
        };

        counter!("usage_reports_total", "outcome" => outcome.as_str()).increment(1);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{
        BillingEvent, CheckoutRequest, CheckoutSession, Customer, Invoice,
        MockBillingProviderClient,
    };
    use crate::domain::DomainError;
    use async_trait::async_trait;

    fn cus_1() -> AccountId {
        AccountId::new("cus_1").unwrap()
    }

    #[tokio::test]
    async fn test_report_emits_exactly_once() {
        let mut billing = MockBillingProviderClient::new();
        billing
            .expect_emit_usage()
            .withf(|record| {
                record.account_id.as_str() == "cus_1"
                    && record.subscription_item_id.as_deref() == Some("si_1")
                    && record.quantity == 1
            })
            .times(1)
            .returning(|_| Ok(()));

        let reporter = UsageReporter::new(Arc::new(billing), Duration::from_secs(1));

        assert_eq!(reporter.report(&cus_1(), Some("si_1")).await, UsageOutcome::Recorded);
    }

    #[tokio::test]
    async fn test_report_failure_is_reported_not_raised() {
        let mut billing = MockBillingProviderClient::new();
        billing
            .expect_emit_usage()
            .times(1)
            .returning(|_| Err(DomainError::provider("stripe", "HTTP 500")));

        let reporter = UsageReporter::new(Arc::new(billing), Duration::from_secs(1));

        assert_eq!(reporter.report(&cus_1(), None).await, UsageOutcome::Failed);
    }

    /// Provider whose usage endpoint never answers in time
    struct SlowBilling;

    #[async_trait]
    impl BillingProviderClient for SlowBilling {
        async fn create_checkout_session(
            &self,
            _: CheckoutRequest,
        ) -> Result<CheckoutSession, DomainError> {
            unreachable!()
        }

        async fn retrieve_checkout_session(&self, _: &str) -> Result<CheckoutSession, DomainError> {
            unreachable!()
        }

        async fn retrieve_customer(&self, _: &str) -> Result<Customer, DomainError> {
            unreachable!()
        }

        async fn emit_usage(&self, _: &UsageRecord) -> Result<(), DomainError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }

        async fn upcoming_invoice(&self, _: &str) -> Result<Invoice, DomainError> {
            unreachable!()
        }

        async fn verify_and_parse_event(&self, _: &[u8], _: &str) -> Result<BillingEvent, DomainError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_report_times_out() {
        let reporter = UsageReporter::new(Arc::new(SlowBilling), Duration::from_millis(20));

        assert_eq!(reporter.report(&cus_1(), None).await, UsageOutcome::TimedOut);
    }
}
