//! Wire types for the carrier's asynchronous print API.

use serde::Deserialize;
use std::fmt;

/// A freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    /// Seconds until expiry, as reported by the auth endpoint.
    pub expires_in_secs: i64,
}

/// Remote status of an asynchronous print job.
///
/// The carrier reports free-form status codes; anything unrecognized keeps
/// polling, only `READY`/`INVALID`/`REMOVED` are meaningful transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintJobStatus {
    Pending,
    Ready,
    Invalid,
    Removed,
    Other(String),
}

impl PrintJobStatus {
    pub fn parse(code: &str) -> Self {
        match code {
            "PENDING" => PrintJobStatus::Pending,
            "READY" => PrintJobStatus::Ready,
            "INVALID" => PrintJobStatus::Invalid,
            "REMOVED" => PrintJobStatus::Removed,
            other => PrintJobStatus::Other(other.to_string()),
        }
    }

    /// Terminal negative status; no point polling further.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, PrintJobStatus::Invalid | PrintJobStatus::Removed)
    }
}

impl fmt::Display for PrintJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintJobStatus::Pending => f.write_str("PENDING"),
            PrintJobStatus::Ready => f.write_str("READY"),
            PrintJobStatus::Invalid => f.write_str("INVALID"),
            PrintJobStatus::Removed => f.write_str("REMOVED"),
            PrintJobStatus::Other(code) => f.write_str(code),
        }
    }
}

/// Accepted print job (HTTP 202 with a job id).
#[derive(Debug, Clone)]
pub struct SubmitAccepted {
    /// Server-assigned job identifier, used for polling and download.
    pub job_id: String,
    /// Per-item states reported at submission time, if any were flagged.
    pub flagged_items: Vec<FlaggedItem>,
}

/// An item the carrier flagged as problematic already at submission.
#[derive(Debug, Clone)]
pub struct FlaggedItem {
    pub tracking_number: String,
    pub state: Option<String>,
    pub errors: Option<serde_json::Value>,
}

// Carrier API response bodies.

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub entity: Option<SubmitEntity>,
    #[serde(default)]
    pub requests: Vec<SubRequestInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitEntity {
    pub uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubRequestInfo {
    pub state: Option<String>,
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PollResponse {
    pub entity: Option<PollEntity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PollEntity {
    #[serde(default)]
    pub statuses: Vec<StatusEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusEntry {
    pub code: Option<String>,
}

impl PollResponse {
    /// Current status is the last element of the status history, when present.
    pub(crate) fn current_status(&self) -> Option<PrintJobStatus> {
        self.entity
            .as_ref()?
            .statuses
            .last()?
            .code
            .as_deref()
            .map(PrintJobStatus::parse)
    }
}

/// The carrier's rejection body comes in (at least) three shapes. Parse them
/// defensively and fall back to a no-details variant rather than assuming a
/// canonical schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitErrorDetails {
    /// Per-item errors under `requests[].errors`, paired with the tracking
    /// number at the same index where possible.
    PerItem(Vec<(String, String)>),
    /// Top-level `alerts` list.
    Alerts(Vec<serde_json::Value>),
    /// Top-level `errors` list.
    Errors(Vec<serde_json::Value>),
    /// Body was not JSON or matched none of the known shapes.
    NoDetails,
}

#[derive(Debug, Deserialize)]
struct SubmitErrorBody {
    #[serde(default)]
    requests: Vec<SubRequestInfo>,
    #[serde(default)]
    alerts: Vec<serde_json::Value>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Extract structured error details from a rejection body.
pub fn parse_submit_error(body: &str, tracking_numbers: &[String]) -> SubmitErrorDetails {
    let Ok(parsed) = serde_json::from_str::<SubmitErrorBody>(body) else {
        return SubmitErrorDetails::NoDetails;
    };

    let per_item: Vec<(String, String)> = parsed
        .requests
        .iter()
        .enumerate()
        .filter_map(|(idx, req)| {
            req.errors.as_ref().map(|errors| {
                let tn = tracking_numbers
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", idx));
                (tn, errors.to_string())
            })
        })
        .collect();

    if !per_item.is_empty() {
        SubmitErrorDetails::PerItem(per_item)
    } else if !parsed.alerts.is_empty() {
        SubmitErrorDetails::Alerts(parsed.alerts.into_iter().take(3).collect())
    } else if !parsed.errors.is_empty() {
        SubmitErrorDetails::Errors(parsed.errors.into_iter().take(3).collect())
    } else {
        SubmitErrorDetails::NoDetails
    }
}

impl fmt::Display for SubmitErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitErrorDetails::PerItem(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|(tn, err)| format!("{}: {}", tn, err))
                    .collect();
                write!(f, "per-item errors: {}", rendered.join("; "))
            }
            SubmitErrorDetails::Alerts(alerts) => {
                write!(f, "alerts: {}", serde_json::Value::Array(alerts.clone()))
            }
            SubmitErrorDetails::Errors(errors) => {
                write!(f, "errors: {}", serde_json::Value::Array(errors.clone()))
            }
            SubmitErrorDetails::NoDetails => f.write_str("no specific error details"),
        }
    }
}
