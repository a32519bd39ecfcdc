//! # General Route Handlers
//!
//! The root banner, the health check and the template listing.

use super::{wrap_response, ApiResponse, AppState, DebugParams};
use crate::types::HealthResponse;
use axum::{
    extract::{Query, State},
    Json,
};

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "metaprompt server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Lists the registered document types, in sorted order.
pub async fn list_templates_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
) -> Json<ApiResponse<Vec<String>>> {
    let kinds = app_state
        .store
        .kinds()
        .into_iter()
        .map(|kind| kind.to_string())
        .collect();
    wrap_response(kinds, debug_params, None)
}
