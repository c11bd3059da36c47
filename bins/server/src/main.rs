//! GL report server
//!
//! Loads a ledger snapshot and serves the registered reports over HTTP.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glreport_api::{AppState, create_router};
use glreport_core::currency::RateTableConverter;
use glreport_core::reports::{GeneralLedgerReport, ReportRegistry};
use glreport_core::store::InMemoryLedger;
use glreport_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glreport=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let ledger = Arc::new(
        InMemoryLedger::load(&config.ledger.snapshot_path)
            .with_context(|| format!("Failed to load {}", config.ledger.snapshot_path))?,
    );
    let converter = Arc::new(RateTableConverter::new(ledger.rate_table()));

    let mut registry = ReportRegistry::new();
    registry.register(Arc::new(GeneralLedgerReport::new(
        ledger.clone(),
        ledger,
        converter,
        config.reports.clone(),
    )));
    info!(reports = ?registry.names(), "Reports registered");

    let app = create_router(AppState::new(registry));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
