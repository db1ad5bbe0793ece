//! Services Routes
//!
//! - GET /services/status - Service info for operational tooling

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::ServiceStatusResponse;
use crate::api::state::AppState;

/// GET /services/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ServiceStatusResponse> {
    Json(ServiceStatusResponse {
        service: "ledgerlink".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        open_sessions: state.open_sessions().await,
    })
}
