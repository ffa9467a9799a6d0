//! Gating middleware for the Vestibule shell.
//!
//! Two orthogonal layers: the maintenance gate decides whether a navigation
//! renders real content, the loading shell, or the splash; the session guard
//! redirects viewers without a session token to the public landing page. The
//! gate runs outermost, so a blocked viewer sees the splash regardless of
//! session state.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};

use vestibule_core::gate::{AuthDecision, GateDecision};

use crate::routes::pages;
use crate::state::AppState;

/// Apply the maintenance gate to a page navigation.
///
/// `Loading` answers 503 with a short retry hint; the store's initial read
/// completes before the listener binds, so viewers only ever see it if a
/// request races startup. `Blocked` answers 503 with the splash carrying
/// the stored message.
pub async fn maintenance_gate(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    match state.gate.decide(&path).await {
        GateDecision::Open => next.run(req).await,
        GateDecision::Loading => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::RETRY_AFTER, "1")],
            Html(pages::loading_shell()),
        )
            .into_response(),
        GateDecision::Blocked { message } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(pages::maintenance_splash(&message)),
        )
            .into_response(),
    }
}

/// Require session presence for a page; otherwise send the viewer to the
/// landing page. Presence-only, like the rest of the shell's auth.
pub async fn session_guard(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    match state.gate.authorize().await {
        AuthDecision::Allow => next.run(req).await,
        AuthDecision::RedirectToLanding => Redirect::to("/").into_response(),
    }
}
