mod config;
mod error;
mod loading;
mod reporter;
mod server;
mod service;
mod store;

use anyhow::Context;
use config::DispatchConfig;
use reporter::BatteryReporter;
use server::RequestHandler;
use service::DispatchService;
use std::sync::Arc;
use store::{DroneStore, MemoryStore, SeedData};
use tokio::net::TcpListener;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DispatchConfig::from_env()?;

    info!("[STARTUP] Drone dispatch starting");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Battery report every {:?}", config.battery_report_interval);
    if config.flatten_error_status {
        info!("  Error statuses flattened to BAD_REQUEST");
    }

    let store = match &config.seed_path {
        Some(path) => {
            let seed = SeedData::from_path(path)
                .await
                .with_context(|| format!("failed to read seed file {}", path.display()))?;
            let store = seed.into_store().await.context("invalid seed data")?;
            info!("[STARTUP] Seeded from {}", path.display());
            store
        }
        None => MemoryStore::new(),
    };
    info!("[STARTUP] {} drone(s) registered", store.drone_count().await);

    let store: Arc<dyn DroneStore> = Arc::new(store);
    let service = Arc::new(DispatchService::new(store));

    // Parked drones are reported, never recovered automatically
    let parked = service.drones_parked_in_loading().await?;
    if !parked.is_empty() {
        warn!(
            "[STARTUP] {} drone(s) left in LOADING by an interrupted load",
            parked.len()
        );
    }

    let _reporter = BatteryReporter::new(service.clone(), config.battery_report_interval).start();
    info!("[STARTUP] Battery reporter started");

    let handler = Arc::new(RequestHandler::new(service, config.flatten_error_status));
    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tokio::select! {
        result = server::serve(listener, handler) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("[STARTUP] Shutdown requested");
        }
    }

    Ok(())
}
