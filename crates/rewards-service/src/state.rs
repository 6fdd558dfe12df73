//! Application state.

use std::sync::Arc;

use rewards_ledger::CoinLedger;
use rewards_store::RocksStore;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The coin ledger.
    pub ledger: Arc<CoinLedger<RocksStore>>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over an opened store.
    #[must_use]
    pub fn new(store: RocksStore, config: ServiceConfig) -> Self {
        if config.service_api_key.is_none() {
            tracing::warn!("SERVICE_API_KEY not set - all authenticated requests will be rejected");
        }

        Self {
            ledger: Arc::new(CoinLedger::new(store)),
            config,
        }
    }
}
