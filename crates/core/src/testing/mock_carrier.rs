//! Scriptable in-memory carrier client for workflow tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::account::ExternalAccount;
use crate::carrier::{
    CarrierClient, CarrierError, PrintJobStatus, SubmitAccepted, TokenGrant,
};

type PollResult = Result<Option<PrintJobStatus>, CarrierError>;

#[derive(Default)]
struct MockState {
    /// Per-job poll results, consumed front to back.
    scripted_polls: HashMap<String, Vec<PollResult>>,
    documents: HashMap<String, Vec<u8>>,
    token_error: Option<CarrierError>,
    submit_error: Option<CarrierError>,
    download_error: Option<CarrierError>,
    token_calls: usize,
    submit_calls: usize,
    poll_calls: usize,
    download_calls: usize,
}

/// Mock carrier with scriptable per-job status sequences and call counters.
///
/// `submit_print_job` hands out job ids `job-1`, `job-2`, ... in call order;
/// tests script poll results and documents against those ids.
#[derive(Default)]
pub struct MockCarrierClient {
    state: RwLock<MockState>,
}

impl MockCarrierClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the sequence of poll results for a job id.
    pub async fn script_job(&self, job_id: &str, polls: Vec<PollResult>) {
        let mut state = self.state.write().await;
        state.scripted_polls.insert(job_id.to_string(), polls);
    }

    /// Set the document returned when a job is downloaded.
    pub async fn set_document(&self, job_id: &str, content: Vec<u8>) {
        let mut state = self.state.write().await;
        state.documents.insert(job_id.to_string(), content);
    }

    pub async fn fail_token(&self, error: CarrierError) {
        self.state.write().await.token_error = Some(error);
    }

    pub async fn fail_submit(&self, error: CarrierError) {
        self.state.write().await.submit_error = Some(error);
    }

    pub async fn fail_download(&self, error: CarrierError) {
        self.state.write().await.download_error = Some(error);
    }

    pub async fn token_calls(&self) -> usize {
        self.state.read().await.token_calls
    }

    pub async fn submit_calls(&self) -> usize {
        self.state.read().await.submit_calls
    }

    pub async fn poll_calls(&self) -> usize {
        self.state.read().await.poll_calls
    }

    pub async fn download_calls(&self) -> usize {
        self.state.read().await.download_calls
    }
}

#[async_trait]
impl CarrierClient for MockCarrierClient {
    async fn fetch_token(&self, _account: &ExternalAccount) -> Result<TokenGrant, CarrierError> {
        let mut state = self.state.write().await;
        state.token_calls += 1;
        if let Some(error) = &state.token_error {
            return Err(error.clone());
        }
        Ok(TokenGrant {
            access_token: format!("mock-token-{}", state.token_calls),
            expires_in_secs: 3600,
        })
    }

    async fn submit_print_job(
        &self,
        _token: &str,
        _tracking_numbers: &[String],
    ) -> Result<SubmitAccepted, CarrierError> {
        let mut state = self.state.write().await;
        state.submit_calls += 1;
        if let Some(error) = &state.submit_error {
            return Err(error.clone());
        }
        Ok(SubmitAccepted {
            job_id: format!("job-{}", state.submit_calls),
            flagged_items: Vec::new(),
        })
    }

    async fn poll_print_job(
        &self,
        _token: &str,
        job_id: &str,
    ) -> Result<Option<PrintJobStatus>, CarrierError> {
        let mut state = self.state.write().await;
        state.poll_calls += 1;
        match state.scripted_polls.get_mut(job_id) {
            Some(polls) if !polls.is_empty() => polls.remove(0),
            // An exhausted or unscripted job stays pending.
            _ => Ok(Some(PrintJobStatus::Pending)),
        }
    }

    async fn download_document(
        &self,
        _token: &str,
        job_id: &str,
    ) -> Result<Vec<u8>, CarrierError> {
        let mut state = self.state.write().await;
        state.download_calls += 1;
        if let Some(error) = &state.download_error {
            return Err(error.clone());
        }
        state
            .documents
            .get(job_id)
            .cloned()
            .ok_or_else(|| CarrierError::Download {
                status: 404,
                content_type: "text/plain".to_string(),
                snippet: format!("no document scripted for {}", job_id),
            })
    }
}
