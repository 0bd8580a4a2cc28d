use gateway::config::GatewayConfig;
use gateway::embedder::HttpEmbedder;
use gateway::ledger::HttpLedger;
use gateway::router::create_router;
use gateway::state::AppState;

use audit_log::AuditLog;
use identity_store::{FileStore, IdentityStore};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env()?;
    tracing::info!("Starting FacePay gateway");

    let audit = AuditLog::open(config.data_dir.join("attempts.bin"))?;
    let store: Arc<dyn IdentityStore> = Arc::new(FileStore::open(
        config.data_dir.join("identities.bin"),
        config.embedding_dim,
    )?);
    let embedder = Arc::new(HttpEmbedder::new(&config.embedder_url, config.call_timeout)?);
    let ledger = Arc::new(HttpLedger::new(&config.ledger_url, config.call_timeout)?);

    let config = Arc::new(config);
    let state = AppState::new(config.clone(), embedder, store, ledger, audit);
    let app = create_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
