//! UE movement endpoint handlers.
//!
//! Thin wiring over the mobility engine: request validation and error
//! mapping only. Credential checks are assumed to have happened upstream;
//! the owner context arrives in the `X-Owner-Id` header.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use domain::models::Ue;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Request body for start-loop and stop-loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopRequest {
    pub supi: String,
}

/// Request body for a one-shot location update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgResponse {
    pub msg: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopStateResponse {
    pub running: bool,
}

fn owner_id(headers: &HeaderMap) -> Result<i64, ApiError> {
    headers
        .get("x-owner-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing or invalid X-Owner-Id header".into()))
}

/// `POST /api/v1/ue-movement/start-loop`
pub async fn start_loop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoopRequest>,
) -> Result<Json<MsgResponse>, ApiError> {
    let owner_id = owner_id(&headers)?;
    state.engine.start_loop(&request.supi, owner_id).await?;
    Ok(Json(MsgResponse {
        msg: "Loop started".to_string(),
    }))
}

/// `POST /api/v1/ue-movement/stop-loop`
pub async fn stop_loop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoopRequest>,
) -> Result<Json<MsgResponse>, ApiError> {
    owner_id(&headers)?;
    state.engine.stop_loop(&request.supi).await?;
    Ok(Json(MsgResponse {
        msg: "Loop ended".to_string(),
    }))
}

/// `GET /api/v1/ue-movement/state-ues`
pub async fn state_ues(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Ue>>, ApiError> {
    let owner_id = owner_id(&headers)?;
    Ok(Json(state.engine.list_ues(owner_id).await))
}

/// `GET /api/v1/ue-movement/state-loop/:supi`
pub async fn loop_state(
    State(state): State<AppState>,
    Path(supi): Path<String>,
) -> Json<LoopStateResponse> {
    Json(LoopStateResponse {
        running: state.engine.is_running(&supi).await,
    })
}

/// `GET /api/v1/ue-movement/handovers/:supi`
pub async fn handovers(
    State(state): State<AppState>,
    Path(supi): Path<String>,
) -> Json<Vec<i64>> {
    Json(state.engine.handover_history(&supi).await)
}

/// `POST /api/v1/ue-movement/update-location/:supi`
pub async fn update_location(
    State(state): State<AppState>,
    Path(supi): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateLocationRequest>,
) -> Result<Json<Ue>, ApiError> {
    let owner_id = owner_id(&headers)?;
    request.validate()?;
    let ue = state
        .engine
        .update_single_location(&supi, owner_id, request.latitude, request.longitude)
        .await?;
    Ok(Json(ue))
}

/// `GET /api/v1/ue-movement/distances/:supi`
pub async fn distances(
    State(state): State<AppState>,
    Path(supi): Path<String>,
    headers: HeaderMap,
) -> Result<Json<HashMap<i64, f64>>, ApiError> {
    let owner_id = owner_id(&headers)?;
    Ok(Json(state.engine.distances(&supi, owner_id).await?))
}

/// `GET /api/v1/ue-movement/path-losses/:supi`
pub async fn path_losses(
    State(state): State<AppState>,
    Path(supi): Path<String>,
    headers: HeaderMap,
) -> Result<Json<HashMap<i64, f64>>, ApiError> {
    let owner_id = owner_id(&headers)?;
    Ok(Json(state.engine.path_losses(&supi, owner_id).await?))
}

/// `GET /api/v1/ue-movement/rsrps/:supi`
pub async fn rsrps(
    State(state): State<AppState>,
    Path(supi): Path<String>,
    headers: HeaderMap,
) -> Result<Json<HashMap<i64, f64>>, ApiError> {
    let owner_id = owner_id(&headers)?;
    Ok(Json(state.engine.rsrps(&supi, owner_id).await?))
}
