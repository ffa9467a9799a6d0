//! Maintenance control endpoints, mounted under `/superadmin/api`.
//!
//! Both verbs require the bypass credential: the pages under `/superadmin`
//! stay reachable during maintenance so an operator can log in, but the
//! controls themselves only answer to a profile that holds the bypass.
//! Writes go through the store so every sibling instance sees the change
//! on the bus immediately, not at the next reconcile.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/maintenance", get(read_maintenance).put(write_maintenance))
}

#[derive(Debug, Serialize)]
pub struct MaintenanceView {
    pub enabled: bool,
    pub message: String,
    pub api_reachable: bool,
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceUpdate {
    pub enabled: bool,
    #[serde(default)]
    pub message: Option<String>,
}

async fn read_maintenance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MaintenanceView>, AppError> {
    require_bypass(&state).await?;
    Ok(Json(current_view(&state)))
}

async fn write_maintenance(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MaintenanceUpdate>,
) -> Result<Json<MaintenanceView>, AppError> {
    require_bypass(&state).await?;
    if body.enabled {
        state.store.enable(body.message.as_deref()).await?;
    } else {
        state.store.disable().await?;
    }
    info!(enabled = body.enabled, "maintenance mode updated");
    Ok(Json(current_view(&state)))
}

async fn require_bypass(state: &AppState) -> Result<(), AppError> {
    if state.store.can_bypass().await {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "maintenance controls require the bypass credential".into(),
        ))
    }
}

fn current_view(state: &AppState) -> MaintenanceView {
    let status = state.store.snapshot();
    MaintenanceView {
        enabled: status.enabled,
        message: status.message,
        api_reachable: status.api_reachable,
    }
}
