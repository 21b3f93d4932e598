// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::orchestrator::ModeOrchestrator;
use crate::application::relay_driver::RelayDriver;
use crate::application::status_service::StatusService;
use crate::infrastructure::config::{load_mode_catalog, load_settings};
use crate::infrastructure::relay_board::SimulatedRelayBoard;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    health_check, list_modes, read_status, set_equipment, switch_mode,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let settings = load_settings()?;
    let catalog = Arc::new(load_mode_catalog("config/modes.json")?);

    // Create the relay driver (infrastructure layer); boots fail-safe with
    // every output de-energized
    let driver: Arc<dyn RelayDriver> = Arc::new(SimulatedRelayBoard::new(settings.relays.clone()));

    // Create services (application layer)
    let orchestrator =
        ModeOrchestrator::new(catalog.clone(), driver.clone(), settings.valve.travel_ms);
    let status_service = StatusService::new(orchestrator.clone(), catalog, driver);

    // Create application state
    let state = Arc::new(AppState {
        orchestrator,
        status_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/status", get(read_status))
        .route("/api/modes", get(list_modes))
        .route("/api/modes/:key", post(switch_mode))
        .route("/api/equipment", post(set_equipment))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings.server.listen.parse()?;
    tracing::info!("starting pool-controller on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
