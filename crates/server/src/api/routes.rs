use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{accounts, handlers, labels, orders};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Accounts
        .route("/accounts", post(accounts::create_account))
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts/{id}", get(accounts::get_account))
        .route("/accounts/{id}", put(accounts::update_account))
        .route("/accounts/{id}", delete(accounts::delete_account))
        .route("/accounts/{id}/default", post(accounts::set_default_account))
        // Orders
        .route("/orders", get(orders::list_orders))
        // Labels
        .route("/labels", post(labels::fetch_labels))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use labelbridge_core::account::{AccountKind, AccountStore, NewAccount, SqliteAccountStore};
    use labelbridge_core::carrier::TokenCache;
    use labelbridge_core::config::load_config_from_str;
    use labelbridge_core::orchestrator::LabelOrchestrator;
    use labelbridge_core::testing::MockCarrierClient;

    fn test_state() -> (Arc<AppState>, Arc<SqliteAccountStore>, Arc<TokenCache>) {
        let config = load_config_from_str(
            r#"
[carrier]
base_url = "http://127.0.0.1:1/v2"
"#,
        )
        .unwrap();
        let accounts = Arc::new(SqliteAccountStore::in_memory().unwrap());
        let tokens = Arc::new(TokenCache::new());
        let orchestrator = Arc::new(LabelOrchestrator::new(
            accounts.clone(),
            Arc::new(MockCarrierClient::new()),
            Arc::clone(&tokens),
            config.workflow.clone(),
        ));
        let state = Arc::new(AppState::new(
            config,
            accounts.clone(),
            Arc::clone(&tokens),
            orchestrator,
            None,
        ));
        (state, accounts, tokens)
    }

    fn seed_carrier_account(accounts: &SqliteAccountStore) -> i64 {
        accounts
            .create(NewAccount {
                tenant_id: 1,
                kind: AccountKind::Carrier,
                name: "main".to_string(),
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                warehouse: None,
            })
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_health_route() {
        let (state, _, _) = test_state();
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_updating_credentials_drops_cached_token() {
        let (state, accounts, tokens) = test_state();
        let id = seed_carrier_account(&accounts);
        tokens
            .insert(id, "stale".to_string(), Utc::now() + Duration::seconds(600))
            .await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/v1/accounts/{}", id))
                    .header("content-type", "application/json")
                    .header("x-tenant-id", "1")
                    .body(Body::from(
                        r#"{"name":"main","client_id":"id","client_secret":"rotated"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(tokens.fresh_token(id).await, None);
    }

    #[tokio::test]
    async fn test_deleting_account_drops_cached_token() {
        let (state, accounts, tokens) = test_state();
        let id = seed_carrier_account(&accounts);
        tokens
            .insert(id, "stale".to_string(), Utc::now() + Duration::seconds(600))
            .await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/accounts/{}", id))
                    .header("x-tenant-id", "1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(tokens.fresh_token(id).await, None);
    }
}
