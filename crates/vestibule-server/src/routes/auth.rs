//! Session endpoints.
//!
//! Presence-only authentication: login stores the submitted credential in
//! the profile, logout removes it. No verification happens here — the
//! portal only gates on whether a credential is present. An operator login
//! additionally stores the maintenance bypass credential, which is what
//! lets `/superadmin/api` calls through during maintenance.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub credential: String,
    #[serde(default)]
    pub superadmin: bool,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<StatusCode, AppError> {
    if body.credential.is_empty() {
        return Err(AppError::BadRequest("credential must not be empty".into()));
    }
    state.credentials.store_session(&body.credential).await?;
    if body.superadmin {
        state.credentials.store_bypass(&body.credential).await?;
    }
    info!(superadmin = body.superadmin, "session opened");
    Ok(StatusCode::NO_CONTENT)
}

async fn logout(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    state.credentials.clear_session().await?;
    state.credentials.clear_bypass().await?;
    info!("session closed");
    Ok(StatusCode::NO_CONTENT)
}
