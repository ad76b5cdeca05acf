use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::routes::{health, ue_movement};
use crate::services::mobility::MobilityEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: MobilityEngine,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, engine: MobilityEngine) -> Router {
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
    let state = AppState {
        engine,
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let movement_routes = Router::new()
        .route("/api/v1/ue-movement/start-loop", post(ue_movement::start_loop))
        .route("/api/v1/ue-movement/stop-loop", post(ue_movement::stop_loop))
        .route(
            "/api/v1/ue-movement/state-ues",
            get(ue_movement::state_ues),
        )
        .route(
            "/api/v1/ue-movement/state-loop/:supi",
            get(ue_movement::loop_state),
        )
        .route(
            "/api/v1/ue-movement/handovers/:supi",
            get(ue_movement::handovers),
        )
        .route(
            "/api/v1/ue-movement/update-location/:supi",
            post(ue_movement::update_location),
        )
        .route(
            "/api/v1/ue-movement/distances/:supi",
            get(ue_movement::distances),
        )
        .route(
            "/api/v1/ue-movement/path-losses/:supi",
            get(ue_movement::path_losses),
        )
        .route("/api/v1/ue-movement/rsrps/:supi", get(ue_movement::rsrps));

    let health_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready));

    Router::new()
        .merge(movement_routes)
        .merge(health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .with_state(state)
}
