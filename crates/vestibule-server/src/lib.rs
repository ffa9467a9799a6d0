//! Vestibule HTTP shell.
//!
//! Wires the core library and a storage backend into a running Axum server:
//! maintenance-gated pages, presence-only session routes, the bypass-guarded
//! admin maintenance API, and the local status endpoint other shells or the
//! CLI can poll.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::middleware as axum_mw;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod upstream;

use crate::middleware::{maintenance_gate, session_guard};
use crate::state::AppState;

/// Build the full router with all routes and middleware.
///
/// Shared between `main` and the black-box tests so both exercise the same
/// tree.
pub fn build_router(state: Arc<AppState>) -> Router {
    // App pages require a session; the admin panel pages do too.
    let guarded_pages = Router::new()
        .merge(routes::pages::app_router())
        .merge(routes::pages::admin_router())
        .route_layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            session_guard,
        ));

    // Every page navigation passes the maintenance gate; administrative
    // paths short-circuit to open inside the gate itself.
    let pages = Router::new()
        .merge(routes::pages::public_router())
        .merge(guarded_pages)
        .route_layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            maintenance_gate,
        ));

    // The admin toggle API is bypass-guarded and concurrency-limited.
    let admin_api = Router::new()
        .nest("/superadmin/api", routes::admin::router())
        .layer(tower::limit::ConcurrencyLimitLayer::new(8));

    // The local status endpoint is polled cross-origin by sibling shells.
    let status_api = Router::new()
        .nest("/api", routes::status::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([axum::http::Method::GET]),
        );

    Router::new()
        .merge(pages)
        .merge(admin_api)
        .nest("/auth", routes::auth::router())
        .merge(status_api)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}
