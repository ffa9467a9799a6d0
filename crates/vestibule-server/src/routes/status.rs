//! Public maintenance status endpoint.
//!
//! Serves the same wire shape the portal consumes from its own upstream,
//! so downstream shells can chain off this instance. camelCase fields are
//! part of that wire contract. Exempt from the maintenance gate and served
//! with `Cache-Control: no-store` so callers always see the live state.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/maintenance/status", get(read_status))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub api_reachable: bool,
}

async fn read_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = state.store.snapshot();
    Json(StatusResponse {
        maintenance_mode: status.enabled,
        maintenance_message: status.message,
        api_reachable: status.api_reachable,
    })
}
