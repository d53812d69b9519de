//! Error types for the carrier client.

use thiserror::Error;

/// Errors surfaced by carrier API calls.
#[derive(Debug, Clone, Error)]
pub enum CarrierError {
    /// Client-credential exchange failed. Carries the account display name
    /// so the tenant can tell which credential set is broken.
    #[error("Carrier auth failed for account {account}: {reason}")]
    Auth { account: String, reason: String },

    /// Print job submission was rejected (non-202, or a 202 without a job
    /// id). `detail` is a best-effort rendering of the carrier's error body.
    #[error("Print request rejected (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// Document fetch did not return a printable document.
    #[error("Label download failed: HTTP {status}, content-type {content_type}: {snippet}")]
    Download {
        status: u16,
        content_type: String,
        snippet: String,
    },

    /// Recoverable network/HTTP/parse error. The poll loop retries these in
    /// place; other stages map them into their own terminal error.
    #[error("Transient carrier error: {0}")]
    Transient(String),
}

impl CarrierError {
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient(reason.into())
    }
}

/// Truncate a response body for inclusion in error messages.
pub(crate) fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    if body.is_empty() {
        "no response body".to_string()
    } else {
        body.chars().take(MAX).collect()
    }
}
