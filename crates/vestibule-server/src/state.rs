//! Shared application state for the Vestibule shell.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the maintenance store, the credential
//! store, and the access gate built over both.

use std::sync::Arc;

use vestibule_core::gate::AccessGate;
use vestibule_core::session::CredentialStore;
use vestibule_core::store::MaintenanceStore;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Maintenance status store for this shell instance.
    pub store: Arc<MaintenanceStore>,
    /// Presence-only session and bypass credentials.
    pub credentials: CredentialStore,
    /// Per-navigation gating rules.
    pub gate: AccessGate,
}

impl AppState {
    /// Assemble the state from a store and credentials, building the gate
    /// over them.
    #[must_use]
    pub fn new(store: Arc<MaintenanceStore>, credentials: CredentialStore) -> Self {
        let gate = AccessGate::new(Arc::clone(&store), credentials.clone());
        Self {
            store,
            credentials,
            gate,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
