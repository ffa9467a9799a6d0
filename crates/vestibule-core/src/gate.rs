//! Access gate.
//!
//! Decides, per navigation, which of three renderings a viewer gets: real
//! content, the maintenance splash, or a transient loading shell. A second,
//! orthogonal check guards non-public routes on session presence.
//!
//! Per navigation the gate is a three-state machine `{Loading, Blocked,
//! Open}`. `Loading` can only occur before the store's initial read; the
//! ready flag is monotonic, so once left it is never re-entered. `Blocked`
//! and `Open` are re-entered freely as maintenance state changes.
//! Administrative paths short-circuit to `Open` before any state lookup.

use std::sync::Arc;

use crate::session::CredentialStore;
use crate::store::MaintenanceStore;

/// Path prefix of the administrative route group. Routes under it are
/// exempt from maintenance gating unconditionally, even mid-load.
pub const ADMIN_ROUTE_PREFIX: &str = "/superadmin";

/// True iff the path belongs to the administrative route group. Plain
/// string-prefix test.
#[must_use]
pub fn is_admin_path(path: &str) -> bool {
    path.starts_with(ADMIN_ROUTE_PREFIX)
}

/// Maintenance decision for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Store has not completed its initial read; show a transient loading
    /// shell.
    Loading,
    /// Maintenance is active and the viewer holds no bypass credential;
    /// show the splash with this message.
    Blocked { message: String },
    /// Render real content.
    Open,
}

/// Session decision for one navigation of a non-public route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// A session token is present; render real content.
    Allow,
    /// No session token; send the viewer to the public landing route.
    RedirectToLanding,
}

/// Evaluates the gating rules against the maintenance store and the
/// credential store.
#[derive(Debug, Clone)]
pub struct AccessGate {
    store: Arc<MaintenanceStore>,
    credentials: CredentialStore,
}

impl AccessGate {
    /// Create a gate over the given stores.
    #[must_use]
    pub fn new(store: Arc<MaintenanceStore>, credentials: CredentialStore) -> Self {
        Self { store, credentials }
    }

    /// Maintenance decision for the given path, evaluated in order:
    /// administrative prefix, store readiness, then the maintenance flag
    /// against bypass presence.
    pub async fn decide(&self, path: &str) -> GateDecision {
        if is_admin_path(path) {
            return GateDecision::Open;
        }
        if !self.store.is_ready() {
            return GateDecision::Loading;
        }

        let status = self.store.snapshot();
        if status.enabled && !self.store.can_bypass().await {
            return GateDecision::Blocked {
                message: status.message,
            };
        }
        GateDecision::Open
    }

    /// Session decision for a non-public route. Presence-only.
    pub async fn authorize(&self) -> AuthDecision {
        if self.credentials.has_session().await {
            AuthDecision::Allow
        } else {
            AuthDecision::RedirectToLanding
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vestibule_storage::{MemoryBackend, StorageBackend};

    use super::*;
    use crate::bus::ChangeBus;
    use crate::status::DEFAULT_MAINTENANCE_MESSAGE;

    fn make_gate() -> (MemoryBackend, Arc<MaintenanceStore>, AccessGate) {
        let storage = MemoryBackend::new();
        let store = Arc::new(MaintenanceStore::new(
            Arc::new(storage.clone()),
            ChangeBus::new(),
            None,
        ));
        let credentials = CredentialStore::new(Arc::new(storage.clone()));
        let gate = AccessGate::new(Arc::clone(&store), credentials);
        (storage, store, gate)
    }

    // ── is_admin_path ────────────────────────────────────────────────

    #[test]
    fn admin_prefix_matches_group() {
        assert!(is_admin_path("/superadmin"));
        assert!(is_admin_path("/superadmin/dashboard"));
        assert!(is_admin_path("/superadmin/maintenance"));
        assert!(!is_admin_path("/dashboard"));
        assert!(!is_admin_path("/"));
        assert!(!is_admin_path("/tools/superadmin"));
    }

    // ── decide ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn loading_before_initial_read() {
        let (_storage, _store, gate) = make_gate();
        assert_eq!(gate.decide("/dashboard").await, GateDecision::Loading);
    }

    #[tokio::test]
    async fn open_after_initial_read_without_maintenance() {
        let (_storage, store, gate) = make_gate();
        store.initialize().await;
        assert_eq!(gate.decide("/dashboard").await, GateDecision::Open);
    }

    #[tokio::test]
    async fn blocked_carries_the_stored_message() {
        let (_storage, store, gate) = make_gate();
        store.initialize().await;
        store.enable(Some("Back at 14:00 UTC")).await.unwrap();

        assert_eq!(
            gate.decide("/dashboard").await,
            GateDecision::Blocked {
                message: "Back at 14:00 UTC".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn blocked_falls_back_to_default_message() {
        let (_storage, store, gate) = make_gate();
        store.initialize().await;
        store.enable(None).await.unwrap();

        assert_eq!(
            gate.decide("/tools").await,
            GateDecision::Blocked {
                message: DEFAULT_MAINTENANCE_MESSAGE.to_owned()
            }
        );
    }

    #[tokio::test]
    async fn bypass_credential_opens_gated_route() {
        let (storage, store, gate) = make_gate();
        store.initialize().await;
        store.enable(Some("Closed")).await.unwrap();
        storage.put(crate::status::KEY_BYPASS_TOKEN, b"tok").await.unwrap();

        assert_eq!(gate.decide("/dashboard").await, GateDecision::Open);
    }

    #[tokio::test]
    async fn admin_routes_open_even_while_loading() {
        let (_storage, _store, gate) = make_gate();
        // No initialize: the store is still loading.
        assert_eq!(gate.decide("/superadmin").await, GateDecision::Open);
    }

    #[tokio::test]
    async fn admin_routes_open_during_maintenance_without_bypass() {
        let (_storage, store, gate) = make_gate();
        store.initialize().await;
        store.enable(Some("Closed")).await.unwrap();

        assert_eq!(gate.decide("/superadmin/dashboard").await, GateDecision::Open);
    }

    #[tokio::test]
    async fn gate_reopens_after_disable() {
        let (_storage, store, gate) = make_gate();
        store.initialize().await;
        store.enable(None).await.unwrap();
        assert!(matches!(
            gate.decide("/dashboard").await,
            GateDecision::Blocked { .. }
        ));

        store.disable().await.unwrap();
        assert_eq!(gate.decide("/dashboard").await, GateDecision::Open);
    }

    // ── authorize ────────────────────────────────────────────────────

    #[tokio::test]
    async fn authorize_requires_session_presence() {
        let (storage, _store, gate) = make_gate();
        assert_eq!(gate.authorize().await, AuthDecision::RedirectToLanding);

        storage.put(crate::status::KEY_SESSION_TOKEN, b"opaque").await.unwrap();
        assert_eq!(gate.authorize().await, AuthDecision::Allow);
    }

    #[tokio::test]
    async fn authorize_never_validates_the_token() {
        let (storage, _store, gate) = make_gate();
        // Any non-empty bytes count; validation belongs to the backend.
        storage.put(crate::status::KEY_SESSION_TOKEN, b"x").await.unwrap();
        assert_eq!(gate.authorize().await, AuthDecision::Allow);
    }
}
