//! HTTP carrier client (CDEK-compatible print API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::account::ExternalAccount;
use crate::config::{CarrierConfig, WorkflowConfig};

use super::error::snippet;
use super::types::{PollResponse, SubmitResponse, TokenResponse};
use super::{
    parse_submit_error, CarrierError, FlaggedItem, PrintJobStatus, SubmitAccepted, TokenGrant,
};

/// Print options sent with every submission.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    pub copy_count: u32,
    pub page_format: String,
}

impl From<&WorkflowConfig> for PrintOptions {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            copy_count: config.copy_count,
            page_format: config.page_format.clone(),
        }
    }
}

/// Carrier client speaking the asynchronous barcode-print HTTP API.
pub struct HttpCarrierClient {
    client: Client,
    config: CarrierConfig,
    options: PrintOptions,
}

impl HttpCarrierClient {
    /// Create a new carrier client with the given configuration.
    pub fn new(config: CarrierConfig, options: PrintOptions) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            options,
        }
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}

#[async_trait]
impl super::CarrierClient for HttpCarrierClient {
    async fn fetch_token(&self, account: &ExternalAccount) -> Result<TokenGrant, CarrierError> {
        let url = format!("{}/oauth/token", self.base_url());

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", account.client_id.as_str()),
            ("client_secret", account.client_secret.as_str()),
        ];

        let auth_err = |reason: String| CarrierError::Auth {
            account: account.name.clone(),
            reason,
        };

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(auth_err(format!("HTTP {}: {}", status, snippet(&body))));
        }

        let grant: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_err(format!("Failed to parse token response: {}", e)))?;

        debug!(account = %account.name, "Carrier token obtained");

        Ok(TokenGrant {
            access_token: grant.access_token,
            expires_in_secs: grant.expires_in,
        })
    }

    async fn submit_print_job(
        &self,
        token: &str,
        tracking_numbers: &[String],
    ) -> Result<SubmitAccepted, CarrierError> {
        let url = format!("{}/print/barcodes", self.base_url());

        let orders: Vec<_> = tracking_numbers
            .iter()
            .map(|tn| json!({ "cdek_number": tn }))
            .collect();
        let payload = json!({
            "orders": orders,
            "copy_count": self.options.copy_count,
            "format": self.options.page_format,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CarrierError::transient(format!("Submit request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 202 {
            let parsed: SubmitResponse = serde_json::from_str(&body).map_err(|e| {
                CarrierError::Rejected {
                    status: status.as_u16(),
                    detail: format!("Unparseable accept response: {} ({})", e, snippet(&body)),
                }
            })?;

            let job_id = parsed
                .entity
                .and_then(|e| e.uuid)
                .ok_or_else(|| CarrierError::Rejected {
                    status: status.as_u16(),
                    detail: format!("Accepted without a job id: {}", snippet(&body)),
                })?;

            // Items the carrier already knows it cannot print; the job itself
            // may still go READY for the rest.
            let flagged_items: Vec<FlaggedItem> = parsed
                .requests
                .iter()
                .enumerate()
                .filter(|(_, req)| {
                    req.errors.is_some() || req.state.as_deref() == Some("INVALID")
                })
                .map(|(idx, req)| FlaggedItem {
                    tracking_number: tracking_numbers
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| format!("#{}", idx)),
                    state: req.state.clone(),
                    errors: req.errors.clone(),
                })
                .collect();

            for item in &flagged_items {
                warn!(
                    tracking_number = %item.tracking_number,
                    state = ?item.state,
                    "Carrier flagged item at submission"
                );
            }

            debug!(job_id = %job_id, orders = tracking_numbers.len(), "Print job accepted");

            Ok(SubmitAccepted {
                job_id,
                flagged_items,
            })
        } else if status.as_u16() == 400 {
            let details = parse_submit_error(&body, tracking_numbers);
            Err(CarrierError::Rejected {
                status: 400,
                detail: format!("{} (raw: {})", details, snippet(&body)),
            })
        } else {
            Err(CarrierError::Rejected {
                status: status.as_u16(),
                detail: snippet(&body),
            })
        }
    }

    async fn poll_print_job(
        &self,
        token: &str,
        job_id: &str,
    ) -> Result<Option<PrintJobStatus>, CarrierError> {
        let url = format!("{}/print/barcodes/{}", self.base_url(), job_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CarrierError::transient(format!("Poll request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CarrierError::transient(format!(
                "Poll HTTP {}: {}",
                status,
                snippet(&body)
            )));
        }

        let parsed: PollResponse = response
            .json()
            .await
            .map_err(|e| CarrierError::transient(format!("Unparseable poll response: {}", e)))?;

        Ok(parsed.current_status())
    }

    async fn download_document(
        &self,
        token: &str,
        job_id: &str,
    ) -> Result<Vec<u8>, CarrierError> {
        let url = format!("{}/print/barcodes/{}.pdf", self.base_url(), job_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("Accept", "application/pdf")
            .timeout(Duration::from_secs(self.config.download_timeout_secs as u64))
            .send()
            .await
            .map_err(|e| CarrierError::transient(format!("Download request failed: {}", e)))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if status.as_u16() == 200 && content_type.to_lowercase().contains("application/pdf") {
            let bytes = response.bytes().await.map_err(|e| {
                CarrierError::transient(format!("Failed to read document body: {}", e))
            })?;
            Ok(bytes.to_vec())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(CarrierError::Download {
                status: status.as_u16(),
                content_type,
                snippet: snippet(&body),
            })
        }
    }
}
