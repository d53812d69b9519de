//! Tenant scoping for API handlers.
//!
//! Authentication is handled upstream; every request arrives with an
//! `X-Tenant-Id` header identifying the tenant, and all account and workflow
//! operations are scoped to it explicitly.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Extractor for the tenant a request acts on behalf of.
#[derive(Debug, Clone, Copy)]
pub struct TenantId(pub i64);

#[derive(Debug, Serialize)]
pub struct TenantRejection {
    pub error: String,
}

impl<S: Send + Sync> FromRequestParts<S> for TenantId {
    type Rejection = (StatusCode, Json<TenantRejection>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let reject = |msg: &str| {
            (
                StatusCode::BAD_REQUEST,
                Json(TenantRejection {
                    error: msg.to_string(),
                }),
            )
        };

        let raw = parts
            .headers
            .get(TENANT_HEADER)
            .ok_or_else(|| reject("Missing X-Tenant-Id header"))?
            .to_str()
            .map_err(|_| reject("Invalid X-Tenant-Id header"))?;

        raw.parse::<i64>()
            .map(TenantId)
            .map_err(|_| reject("X-Tenant-Id must be an integer"))
    }
}
