//! Shared application state

use audit_log::AuditLog;
use identity_store::IdentityStore;
use match_engine::MatchEngine;
use std::sync::Arc;

use crate::authorizer::TransferAuthorizer;
use crate::config::GatewayConfig;
use crate::embedder::Embedder;
use crate::ledger::Ledger;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn IdentityStore>,
    pub matcher: MatchEngine,
    pub authorizer: Arc<TransferAuthorizer>,
}

impl AppState {
    pub fn new(
        config: Arc<GatewayConfig>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn IdentityStore>,
        ledger: Arc<dyn Ledger>,
        audit: AuditLog,
    ) -> Self {
        let matcher = MatchEngine::new(config.match_threshold);
        let authorizer = Arc::new(TransferAuthorizer::new(
            matcher.clone(),
            store.clone(),
            ledger,
            Arc::new(audit),
            config.currency.clone(),
            config.call_timeout,
        ));
        Self {
            config,
            embedder,
            store,
            matcher,
            authorizer,
        }
    }
}
