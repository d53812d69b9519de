//! Account CRUD handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use labelbridge_core::account::{
    AccountError, AccountKind, AccountUpdate, ExternalAccount, NewAccount,
};

use super::tenant::TenantId;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an account
#[derive(Debug, Deserialize)]
pub struct CreateAccountBody {
    pub kind: AccountKind,
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub warehouse: Option<String>,
}

/// Request body for updating an account
#[derive(Debug, Deserialize)]
pub struct UpdateAccountBody {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub warehouse: Option<String>,
}

/// Query parameters for listing accounts
#[derive(Debug, Deserialize)]
pub struct ListAccountsParams {
    pub kind: Option<AccountKind>,
}

/// Account representation in responses. The secret never leaves the server.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub kind: AccountKind,
    pub name: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
    pub is_default: bool,
}

impl From<ExternalAccount> for AccountResponse {
    fn from(account: ExternalAccount) -> Self {
        Self {
            id: account.id,
            kind: account.kind,
            name: account.name,
            client_id: account.client_id,
            warehouse: account.warehouse,
            is_default: account.is_default,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListAccountsResponse {
    pub accounts: Vec<AccountResponse>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct AccountErrorResponse {
    pub error: String,
}

fn error_response(e: AccountError) -> (StatusCode, Json<AccountErrorResponse>) {
    let status = match e {
        AccountError::NotFound(_) => StatusCode::NOT_FOUND,
        AccountError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(AccountErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new account
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<CreateAccountBody>,
) -> Result<(StatusCode, Json<AccountResponse>), impl IntoResponse> {
    let request = NewAccount {
        tenant_id,
        kind: body.kind,
        name: body.name,
        client_id: body.client_id,
        client_secret: body.client_secret,
        warehouse: body.warehouse,
    };

    match state.accounts().create(request) {
        Ok(account) => Ok((StatusCode::CREATED, Json(AccountResponse::from(account)))),
        Err(e) => Err(error_response(e)),
    }
}

/// List the tenant's accounts, optionally filtered by kind
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Query(params): Query<ListAccountsParams>,
) -> Result<Json<ListAccountsResponse>, impl IntoResponse> {
    match state.accounts().list(tenant_id, params.kind) {
        Ok(accounts) => Ok(Json(ListAccountsResponse {
            accounts: accounts.into_iter().map(AccountResponse::from).collect(),
        })),
        Err(e) => Err(error_response(e)),
    }
}

/// Get an account by id
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<i64>,
) -> Result<Json<AccountResponse>, impl IntoResponse> {
    match state.accounts().get(tenant_id, id) {
        Ok(Some(account)) => Ok(Json(AccountResponse::from(account))),
        Ok(None) => Err(error_response(AccountError::NotFound(id))),
        Err(e) => Err(error_response(e)),
    }
}

/// Update an account's editable fields
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<i64>,
    Json(body): Json<UpdateAccountBody>,
) -> Result<Json<AccountResponse>, impl IntoResponse> {
    let update = AccountUpdate {
        name: body.name,
        client_id: body.client_id,
        client_secret: body.client_secret,
        warehouse: body.warehouse,
    };

    match state.accounts().update(tenant_id, id, update) {
        Ok(account) => {
            // Edited credentials make any cached token suspect.
            if account.kind == AccountKind::Carrier {
                state.tokens().invalidate(account.id).await;
            }
            Ok(Json(AccountResponse::from(account)))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Delete an account
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<i64>,
) -> Result<Json<AccountResponse>, impl IntoResponse> {
    match state.accounts().delete(tenant_id, id) {
        Ok(account) => {
            if account.kind == AccountKind::Carrier {
                state.tokens().invalidate(account.id).await;
            }
            Ok(Json(AccountResponse::from(account)))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Flag an account as the tenant's default for its kind
pub async fn set_default_account(
    State(state): State<Arc<AppState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<i64>,
) -> Result<Json<AccountResponse>, impl IntoResponse> {
    match state.accounts().set_default(tenant_id, id) {
        Ok(account) => Ok(Json(AccountResponse::from(account))),
        Err(e) => Err(error_response(e)),
    }
}
