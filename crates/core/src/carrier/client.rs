//! Carrier client trait.

use async_trait::async_trait;

use crate::account::ExternalAccount;

use super::{CarrierError, PrintJobStatus, SubmitAccepted, TokenGrant};

/// Trait for carrier API backends.
///
/// One implementation talks HTTP to the real carrier; the mock in
/// `crate::testing` scripts responses for workflow tests.
#[async_trait]
pub trait CarrierClient: Send + Sync {
    /// Exchange an account's client credentials for a bearer token.
    async fn fetch_token(&self, account: &ExternalAccount) -> Result<TokenGrant, CarrierError>;

    /// Submit one print job covering the given tracking numbers.
    async fn submit_print_job(
        &self,
        token: &str,
        tracking_numbers: &[String],
    ) -> Result<SubmitAccepted, CarrierError>;

    /// Poll the current status of a print job.
    async fn poll_print_job(
        &self,
        token: &str,
        job_id: &str,
    ) -> Result<Option<PrintJobStatus>, CarrierError>;

    /// Download the rendered document for a READY job.
    async fn download_document(
        &self,
        token: &str,
        job_id: &str,
    ) -> Result<Vec<u8>, CarrierError>;
}
