//! Single-batch label acquisition state machine.
//!
//! One batch runs submit, poll, download against the carrier. Failures are
//! contained to the batch so the caller can keep processing siblings.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::account::ExternalAccount;
use crate::carrier::{CarrierClient, CarrierError, PrintJobStatus, TokenCache};
use crate::config::WorkflowConfig;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Carrier authentication failed: {0}")]
    AuthFailed(String),
    #[error("Print job rejected at submission: {0}")]
    SubmitRejected(String),
    #[error("Print job {job_id} entered terminal status {status}")]
    JobInvalid { job_id: String, status: String },
    #[error("Print job {job_id} not ready after {attempts} poll attempts")]
    PollTimeout { job_id: String, attempts: u32 },
    #[error("Document download failed for job {job_id}: {reason}")]
    DownloadFailed { job_id: String, reason: String },
}

/// Run one batch through the full submit/poll/download cycle.
///
/// The token is resolved through the cache at submission time, so each batch
/// starts with at least the refresh margin of validity, which exceeds one
/// batch's worst-case poll duration.
pub async fn run_batch(
    client: &dyn CarrierClient,
    tokens: &TokenCache,
    account: &ExternalAccount,
    tracking_numbers: &[String],
    config: &WorkflowConfig,
) -> Result<Vec<u8>, WorkflowError> {
    let token = tokens
        .get_token(client, account)
        .await
        .map_err(|e| WorkflowError::AuthFailed(e.to_string()))?;

    let accepted = client
        .submit_print_job(&token, tracking_numbers)
        .await
        .map_err(|e| WorkflowError::SubmitRejected(e.to_string()))?;
    let job_id = accepted.job_id;

    info!(
        job_id = %job_id,
        orders = tracking_numbers.len(),
        "Print job submitted, polling for readiness"
    );

    for attempt in 1..=config.poll_attempts {
        match client.poll_print_job(&token, &job_id).await {
            Ok(Some(PrintJobStatus::Ready)) => {
                debug!(job_id = %job_id, attempt, "Print job ready");
                return client.download_document(&token, &job_id).await.map_err(|e| {
                    WorkflowError::DownloadFailed {
                        job_id: job_id.clone(),
                        reason: e.to_string(),
                    }
                });
            }
            Ok(Some(status)) if status.is_terminal_failure() => {
                return Err(WorkflowError::JobInvalid {
                    job_id,
                    status: status.to_string(),
                });
            }
            Ok(status) => {
                debug!(job_id = %job_id, attempt, status = ?status, "Print job not ready yet");
            }
            // Transient poll failures consume an attempt rather than
            // aborting the batch.
            Err(CarrierError::Transient(reason)) => {
                warn!(job_id = %job_id, attempt, %reason, "Poll attempt failed");
            }
            Err(e) => {
                warn!(job_id = %job_id, attempt, error = %e, "Poll attempt failed");
            }
        }

        if attempt < config.poll_attempts && config.poll_interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
        }
    }

    Err(WorkflowError::PollTimeout {
        job_id,
        attempts: config.poll_attempts,
    })
}
