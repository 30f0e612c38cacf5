//! LODGR Server: application entry point.

use lodgr_db::{DbConfig, DbManager, SurrealIdentityProvider, SurrealOccupancyStore};
use lodgr_ledger::config::LedgerConfig;
use lodgr_ledger::service::OccupancyLedger;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lodgr=info".parse().unwrap()))
        .json()
        .init();

    tracing::info!("Starting LODGR server...");

    let manager = match DbManager::connect(&DbConfig::from_env()).await {
        Ok(manager) => manager,
        Err(err) => {
            tracing::error!(error = %err, "failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(err) = manager.migrate().await {
        tracing::error!(error = %err, "failed to run migrations");
        std::process::exit(1);
    }

    let db = manager.client().clone();
    let _ledger = OccupancyLedger::new(
        SurrealOccupancyStore::new(db.clone()),
        SurrealIdentityProvider::new(db),
        LedgerConfig::default(),
    );

    tracing::info!("Occupancy ledger ready");

    // TODO: Mount the REST API routes on top of the ledger.

    tracing::info!("LODGR server stopped.");
}
