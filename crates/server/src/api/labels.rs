//! Label acquisition endpoint.
//!
//! The response is one of three distinguishable shapes: a raw PDF (single
//! successful batch), a zip archive (multiple documents, possibly with
//! per-batch failures reported in headers), or a JSON error list.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use labelbridge_core::orchestrator::OrchestratorError;
use labelbridge_core::workflow::{BatchFailure, LabelDocument, LabelOutput};

use super::tenant::TenantId;
use crate::state::AppState;

/// Count of failed batches accompanying an archive response.
pub const FAILURE_COUNT_HEADER: &str = "x-label-failure-count";

#[derive(Debug, Deserialize)]
pub struct LabelsRequest {
    pub tracking_numbers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchFailureEntry {
    pub batch: String,
    pub error: String,
}

impl From<BatchFailure> for BatchFailureEntry {
    fn from(failure: BatchFailure) -> Self {
        Self {
            batch: failure.batch,
            error: failure.error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LabelsErrorResponse {
    pub success: bool,
    pub errors: Vec<BatchFailureEntry>,
}

impl LabelsErrorResponse {
    fn new(failures: Vec<BatchFailure>) -> Self {
        Self {
            success: false,
            errors: failures.into_iter().map(BatchFailureEntry::from).collect(),
        }
    }

    fn single(message: String) -> Self {
        Self {
            success: false,
            errors: vec![BatchFailureEntry {
                batch: "request".to_string(),
                error: message,
            }],
        }
    }
}

/// Acquire labels for a list of tracking numbers
pub async fn fetch_labels(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<LabelsRequest>,
) -> Response {
    let output = match state
        .orchestrator()
        .fetch_labels(tenant_id, body.tracking_numbers)
        .await
    {
        Ok(output) => output,
        Err(e) => return orchestrator_error(e),
    };

    match output {
        LabelOutput::Single(doc) => document_response(doc, "application/pdf", "inline", 0),
        LabelOutput::Archive { document, failures } => {
            for failure in &failures {
                warn!(tenant_id, batch = %failure.batch, error = %failure.error, "Batch failed");
            }
            document_response(document, "application/zip", "attachment", failures.len())
        }
        LabelOutput::Failed { failures } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(LabelsErrorResponse::new(failures)),
        )
            .into_response(),
    }
}

fn orchestrator_error(e: OrchestratorError) -> Response {
    let status = match e {
        OrchestratorError::EmptyRequest | OrchestratorError::NoCarrierAccount => {
            StatusCode::BAD_REQUEST
        }
        OrchestratorError::Account(_) | OrchestratorError::Aggregate(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(LabelsErrorResponse::single(e.to_string()))).into_response()
}

fn document_response(
    doc: LabelDocument,
    content_type: &str,
    disposition: &str,
    failure_count: usize,
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type).unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    let disposition_value = format!("{}; filename=\"{}\"", disposition, doc.filename);
    if let Ok(value) = HeaderValue::from_str(&disposition_value) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if failure_count > 0 {
        if let Ok(value) = HeaderValue::from_str(&failure_count.to_string()) {
            headers.insert(FAILURE_COUNT_HEADER, value);
        }
    }

    (StatusCode::OK, headers, doc.content).into_response()
}
