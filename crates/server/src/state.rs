use std::sync::Arc;

use labelbridge_core::account::AccountStore;
use labelbridge_core::carrier::TokenCache;
use labelbridge_core::config::{Config, SanitizedConfig};
use labelbridge_core::marketplace::MarketplaceClient;
use labelbridge_core::orchestrator::LabelOrchestrator;

/// Shared application state for all API handlers.
pub struct AppState {
    config: Config,
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<TokenCache>,
    orchestrator: Arc<LabelOrchestrator>,
    marketplace: Option<Arc<dyn MarketplaceClient>>,
}

impl AppState {
    pub fn new(
        config: Config,
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<TokenCache>,
        orchestrator: Arc<LabelOrchestrator>,
        marketplace: Option<Arc<dyn MarketplaceClient>>,
    ) -> Self {
        Self {
            config,
            accounts,
            tokens,
            orchestrator,
            marketplace,
        }
    }

    pub fn accounts(&self) -> &Arc<dyn AccountStore> {
        &self.accounts
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    pub fn orchestrator(&self) -> &Arc<LabelOrchestrator> {
        &self.orchestrator
    }

    pub fn marketplace(&self) -> Option<&Arc<dyn MarketplaceClient>> {
        self.marketplace.as_ref()
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }
}
