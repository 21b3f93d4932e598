// HTTP request handlers
use crate::application::orchestrator::OrchestratorError;
use crate::domain::equipment::EquipmentPatch;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full status snapshot for polling viewers
pub async fn read_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.status_service.snapshot().await)
}

/// List the catalog modes in display order
pub async fn list_modes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.status_service.modes())
}

/// Request a switch to a catalog mode. Accepted requests return a fresh
/// snapshot that already shows the transition in flight.
pub async fn switch_mode(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.orchestrator.switch_mode(&key).await {
        Ok(()) => Json(state.status_service.snapshot().await).into_response(),
        Err(err) => error_response(err),
    }
}

/// Manual equipment override
pub async fn set_equipment(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<EquipmentPatch>,
) -> Response {
    match state.orchestrator.set_equipment(patch).await {
        Ok(()) => Json(state.status_service.snapshot().await).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: OrchestratorError) -> Response {
    let status = match err {
        OrchestratorError::UnknownMode(_) => StatusCode::NOT_FOUND,
        OrchestratorError::Busy { .. } => StatusCode::CONFLICT,
        OrchestratorError::Driver(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
