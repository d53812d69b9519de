//! Request-level orchestration of the label workflow.
//!
//! Resolves the tenant's carrier account, splits the request into batches,
//! runs each batch through the submit/poll/download cycle and folds the
//! outcomes into one deliverable.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::account::{AccountError, AccountKind, AccountStore};
use crate::carrier::{CarrierClient, TokenCache};
use crate::config::WorkflowConfig;
use crate::workflow::{
    aggregate, chunk, run_batch, AggregateError, BatchFailure, CompletedBatch, LabelOutput,
};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("No tracking numbers provided")]
    EmptyRequest,
    #[error("No carrier account configured for this tenant")]
    NoCarrierAccount,
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Drives label acquisition for tenant requests.
pub struct LabelOrchestrator {
    accounts: Arc<dyn AccountStore>,
    carrier: Arc<dyn CarrierClient>,
    tokens: Arc<TokenCache>,
    config: WorkflowConfig,
}

impl LabelOrchestrator {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        carrier: Arc<dyn CarrierClient>,
        tokens: Arc<TokenCache>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            accounts,
            carrier,
            tokens,
            config,
        }
    }

    /// Acquire labels for the given tracking numbers.
    ///
    /// Batches run sequentially; a failed batch is recorded and does not
    /// stop its siblings. Each batch resolves its own token through the
    /// cache, so an auth problem is one more per-batch failure rather than
    /// a whole-request abort.
    pub async fn fetch_labels(
        &self,
        tenant_id: i64,
        tracking_numbers: Vec<String>,
    ) -> Result<LabelOutput, OrchestratorError> {
        let tracking_numbers: Vec<String> = tracking_numbers
            .into_iter()
            .map(|tn| tn.trim().to_string())
            .filter(|tn| !tn.is_empty())
            .collect();
        if tracking_numbers.is_empty() {
            return Err(OrchestratorError::EmptyRequest);
        }

        let account = self
            .accounts
            .active_account(tenant_id, AccountKind::Carrier)?
            .ok_or(OrchestratorError::NoCarrierAccount)?;

        let batches = chunk(&tracking_numbers, self.config.max_batch_size);
        info!(
            tenant_id,
            account = %account.name,
            orders = tracking_numbers.len(),
            batches = batches.len(),
            "Starting label acquisition"
        );

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (index, batch) in batches.into_iter().enumerate() {
            match run_batch(
                self.carrier.as_ref(),
                &self.tokens,
                &account,
                &batch,
                &self.config,
            )
            .await
            {
                Ok(content) => {
                    successes.push(CompletedBatch {
                        index,
                        tracking_numbers: batch,
                        content,
                    });
                }
                Err(e) => {
                    warn!(tenant_id, batch = index + 1, error = %e, "Batch failed");
                    failures.push(BatchFailure::new(&batch, e));
                }
            }
        }

        info!(
            tenant_id,
            succeeded = successes.len(),
            failed = failures.len(),
            "Label acquisition finished"
        );

        Ok(aggregate(successes, failures, Utc::now())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewAccount;
    use crate::account::SqliteAccountStore;
    use crate::carrier::{CarrierError, PrintJobStatus};
    use crate::testing::MockCarrierClient;

    fn store_with_carrier_account(tenant_id: i64) -> Arc<SqliteAccountStore> {
        let store = SqliteAccountStore::in_memory().unwrap();
        store
            .create(NewAccount {
                tenant_id,
                kind: AccountKind::Carrier,
                name: "main".to_string(),
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                warehouse: None,
            })
            .unwrap();
        Arc::new(store)
    }

    fn orchestrator(
        store: Arc<SqliteAccountStore>,
        client: Arc<MockCarrierClient>,
        max_batch_size: usize,
    ) -> LabelOrchestrator {
        LabelOrchestrator::new(
            store,
            client,
            Arc::new(TokenCache::new()),
            WorkflowConfig {
                max_batch_size,
                poll_attempts: 3,
                poll_interval_ms: 0,
                ..WorkflowConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let store = store_with_carrier_account(1);
        let client = Arc::new(MockCarrierClient::new());
        let orch = orchestrator(store, client, 100);

        let result = orch
            .fetch_labels(1, vec!["".to_string(), "   ".to_string()])
            .await;
        assert!(matches!(result, Err(OrchestratorError::EmptyRequest)));
    }

    #[tokio::test]
    async fn test_missing_carrier_account() {
        let store = Arc::new(SqliteAccountStore::in_memory().unwrap());
        let client = Arc::new(MockCarrierClient::new());
        let orch = orchestrator(store, client, 100);

        let result = orch.fetch_labels(1, vec!["TN-1".to_string()]).await;
        assert!(matches!(result, Err(OrchestratorError::NoCarrierAccount)));
    }

    #[tokio::test]
    async fn test_auth_failure_yields_one_entry_per_batch() {
        let store = store_with_carrier_account(1);
        let client = Arc::new(MockCarrierClient::new());
        client
            .fail_token(CarrierError::Auth {
                account: "main".to_string(),
                reason: "bad credentials".to_string(),
            })
            .await;
        let orch = orchestrator(store, client.clone(), 1);

        let output = orch
            .fetch_labels(1, vec!["TN-1".to_string(), "TN-2".to_string()])
            .await
            .unwrap();
        match output {
            LabelOutput::Failed { failures } => {
                assert_eq!(failures.len(), 2);
                assert!(failures[0].error.contains("bad credentials"));
                assert_eq!(failures[1].batch, "TN-2");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(client.submit_calls().await, 0);
    }

    #[tokio::test]
    async fn test_single_batch_success() {
        let store = store_with_carrier_account(1);
        let client = Arc::new(MockCarrierClient::new());
        client
            .script_job("job-1", vec![Ok(Some(PrintJobStatus::Ready))])
            .await;
        client.set_document("job-1", b"%PDF-1.4".to_vec()).await;
        let orch = orchestrator(store, client.clone(), 100);

        let output = orch
            .fetch_labels(1, vec!["TN-1".to_string(), "TN-2".to_string()])
            .await
            .unwrap();
        assert!(matches!(output, LabelOutput::Single(_)));
        assert_eq!(client.submit_calls().await, 1);
        assert_eq!(client.token_calls().await, 1);
    }

    #[tokio::test]
    async fn test_batches_run_sequentially_and_token_is_reused() {
        let store = store_with_carrier_account(1);
        let client = Arc::new(MockCarrierClient::new());
        for i in 1..=3 {
            let job = format!("job-{}", i);
            client
                .script_job(&job, vec![Ok(Some(PrintJobStatus::Ready))])
                .await;
            client.set_document(&job, b"%PDF-1.4".to_vec()).await;
        }
        let orch = orchestrator(store, client.clone(), 2);

        let tracking: Vec<String> = (0..5).map(|i| format!("TN-{}", i)).collect();
        let output = orch.fetch_labels(1, tracking).await.unwrap();
        match output {
            LabelOutput::Archive { failures, .. } => assert!(failures.is_empty()),
            other => panic!("expected Archive, got {:?}", other),
        }
        assert_eq!(client.submit_calls().await, 3);
        assert_eq!(client.token_calls().await, 1);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_siblings() {
        let store = store_with_carrier_account(1);
        let client = Arc::new(MockCarrierClient::new());
        client
            .script_job("job-1", vec![Ok(Some(PrintJobStatus::Invalid))])
            .await;
        client
            .script_job("job-2", vec![Ok(Some(PrintJobStatus::Ready))])
            .await;
        client.set_document("job-2", b"%PDF-1.4".to_vec()).await;
        let orch = orchestrator(store, client.clone(), 1);

        let output = orch
            .fetch_labels(1, vec!["TN-1".to_string(), "TN-2".to_string()])
            .await
            .unwrap();
        match output {
            LabelOutput::Archive { failures, .. } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].batch, "TN-1");
            }
            other => panic!("expected Archive, got {:?}", other),
        }
        assert_eq!(client.submit_calls().await, 2);
    }

    #[tokio::test]
    async fn test_all_batches_failed() {
        let store = store_with_carrier_account(1);
        let client = Arc::new(MockCarrierClient::new());
        client
            .fail_submit(CarrierError::Rejected {
                status: 400,
                detail: "ORDER_NOT_FOUND".to_string(),
            })
            .await;
        let orch = orchestrator(store, client.clone(), 1);

        let output = orch
            .fetch_labels(1, vec!["TN-1".to_string(), "TN-2".to_string()])
            .await
            .unwrap();
        match output {
            LabelOutput::Failed { failures } => assert_eq!(failures.len(), 2),
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
