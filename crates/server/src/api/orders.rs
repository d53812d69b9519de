//! Marketplace order listing endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use labelbridge_core::account::AccountKind;
use labelbridge_core::marketplace::OrderListing;

use super::tenant::TenantId;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrdersErrorResponse {
    pub error: String,
}

/// List the tenant's awaiting-shipment orders from their active shop
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<OrderListing>, impl IntoResponse> {
    let Some(marketplace) = state.marketplace() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(OrdersErrorResponse {
                error: "Marketplace integration is not configured".to_string(),
            }),
        ));
    };

    let account = match state
        .accounts()
        .active_account(tenant_id, AccountKind::Marketplace)
    {
        Ok(Some(account)) => account,
        Ok(None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(OrdersErrorResponse {
                    error: "No marketplace account configured for this tenant".to_string(),
                }),
            ));
        }
        Err(e) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(OrdersErrorResponse {
                    error: e.to_string(),
                }),
            ));
        }
    };

    Ok(Json(marketplace.list_awaiting_orders(&account).await))
}
