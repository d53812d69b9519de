//! Per-account bearer token cache.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::account::ExternalAccount;

use super::{CarrierClient, CarrierError};

/// Tokens expiring within this margin are treated as already expired, so a
/// token never dies mid-workflow.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Process-wide cache of carrier bearer tokens, keyed by account id.
///
/// Refresh is lazy and synchronous-on-demand: no background task, a caller
/// that finds a stale entry fetches a fresh token itself. Concurrent callers
/// for the same account may race to fetch; the loser's token simply
/// overwrites the winner's, which is harmless.
#[derive(Default)]
pub struct TokenCache {
    tokens: RwLock<HashMap<i64, CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a valid token for the account, fetching a new one if the cached
    /// entry is missing or has less than the refresh margin remaining.
    pub async fn get_token(
        &self,
        client: &dyn CarrierClient,
        account: &ExternalAccount,
    ) -> Result<String, CarrierError> {
        if let Some(token) = self.fresh_token(account.id).await {
            return Ok(token);
        }

        let grant = client.fetch_token(account).await?;
        let expires_at = Utc::now() + Duration::seconds(grant.expires_in_secs);

        debug!(
            account = %account.name,
            expires_in_secs = grant.expires_in_secs,
            "Cached fresh carrier token"
        );

        self.insert(account.id, grant.access_token.clone(), expires_at)
            .await;

        Ok(grant.access_token)
    }

    /// Return the cached token for an account if it still has more than the
    /// refresh margin of validity left.
    pub async fn fresh_token(&self, account_id: i64) -> Option<String> {
        let tokens = self.tokens.read().await;
        let cached = tokens.get(&account_id)?;
        let cutoff = Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS);
        if cached.expires_at > cutoff {
            Some(cached.token.clone())
        } else {
            None
        }
    }

    /// Prime the cache with a token and explicit expiry.
    pub async fn insert(&self, account_id: i64, token: String, expires_at: DateTime<Utc>) {
        let mut tokens = self.tokens.write().await;
        tokens.insert(account_id, CachedToken { token, expires_at });
    }

    /// Drop the cached token for an account (e.g. after credential edits).
    pub async fn invalidate(&self, account_id: i64) {
        let mut tokens = self.tokens.write().await;
        tokens.remove(&account_id);
    }
}
