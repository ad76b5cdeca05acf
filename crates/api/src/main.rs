use anyhow::Result;
use std::time::Duration;
use tracing::info;

use persistence::repositories::{
    CellRepository, PathRepository, SubscriptionRepository, UeRepository,
};

use nef_emulator_api::services::dispatcher::NotificationDispatcher;
use nef_emulator_api::services::mobility::MobilityEngine;
use nef_emulator_api::services::scenario::Scenario;
use nef_emulator_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);

    info!("Starting NEF emulator v{}", env!("CARGO_PKG_VERSION"));

    // Build repositories
    let ues = UeRepository::new();
    let cells = CellRepository::new();
    let paths = PathRepository::new();
    let subscriptions = SubscriptionRepository::new();

    // Seed topology from a scenario file, if configured
    if let Some(scenario_file) = &config.engine.scenario_file {
        info!(file = %scenario_file, "loading scenario");
        let raw = std::fs::read_to_string(scenario_file)?;
        Scenario::from_json(&raw)?.apply(&ues, &cells, &paths).await;
    }

    let dispatcher = NotificationDispatcher::new(
        Duration::from_secs(config.notifications.connect_timeout_secs),
        Duration::from_secs(config.notifications.request_timeout_secs),
    );
    let engine = MobilityEngine::new(
        ues,
        cells,
        paths,
        subscriptions,
        dispatcher,
        config.tick_interval(),
        config.notifications.expected_status,
    );

    // Build application
    let addr = config.socket_addr();
    let app = app::create_app(config, engine);

    // Start server
    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
