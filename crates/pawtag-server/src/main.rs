//! PawTag Server — Application entry point.
//!
//! Connects to SurrealDB, applies migrations, and waits for shutdown.
//! Route handlers for the web platform mount on top of the library
//! surface (`pawtag-scan`) and live outside this subsystem.

use pawtag_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pawtag=info".parse().unwrap()))
        .json()
        .init();

    tracing::info!("Starting PawTag server...");

    let config = DbConfig::from_env();
    let db = match DbManager::connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = pawtag_db::run_migrations(db.client()).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }

    tracing::info!("PawTag server ready");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }

    tracing::info!("PawTag server stopped.");
}
