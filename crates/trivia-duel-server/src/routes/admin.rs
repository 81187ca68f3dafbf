//! Operator routes.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::state::AppState;

/// Request body for POST /maintenance.
#[derive(Debug, Deserialize)]
pub struct MaintenanceRequest {
    /// Whether new play should be refused.
    pub enabled: bool,
}

/// Response body for POST /maintenance.
#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    /// The mode now in effect.
    pub maintenance: bool,
    /// The mode before the request.
    pub previous: bool,
}

/// POST /maintenance
#[instrument(skip(state))]
async fn set_maintenance(
    State(state): State<AppState>,
    Json(request): Json<MaintenanceRequest>,
) -> Json<MaintenanceResponse> {
    let previous = state.set_maintenance(request.enabled);
    if previous != request.enabled {
        warn!(enabled = request.enabled, "maintenance mode switched");
    }
    Json(MaintenanceResponse {
        maintenance: request.enabled,
        previous,
    })
}

/// Returns the router for operator endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/maintenance", post(set_maintenance))
}
