//! Maintenance status store.
//!
//! The single source of truth for maintenance state within one store
//! instance, kept loosely consistent with sibling instances over the same
//! profile storage (via the change bus) and with the platform API (via
//! periodic best-effort reconciliation). The consistency model is
//! last-writer-wins on storage: maintenance state is advisory gating for
//! page rendering, not a security boundary, so eventual convergence is
//! enough.
//!
//! Read paths never fail outward. Storage trouble degrades to "not in
//! maintenance" with the default message, and every reconciliation failure
//! is absorbed here, visible only through `api_reachable`. The one place an
//! error escapes is the administrative write path (`enable`/`disable`), so
//! an operator sees when a toggle did not persist.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;
use vestibule_storage::StorageBackend;

use crate::bus::ChangeBus;
use crate::error::StoreError;
use crate::source::{RemoteStatus, StatusSource};
use crate::status::{
    DEFAULT_MAINTENANCE_MESSAGE, KEY_BYPASS_TOKEN, KEY_MAINTENANCE_ENABLED,
    KEY_MAINTENANCE_MESSAGE, MaintenanceStatus,
};

/// Outer bound on a single remote reconciliation attempt.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default spacing between reconciliation attempts.
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(120);

/// Maintenance status store for one instance.
///
/// Holds in-memory state behind a `watch` channel so gates and pages can
/// either pull a [`snapshot`](Self::snapshot) or
/// [`subscribe`](Self::subscribe) to changes. Each instance carries a
/// random id used to tag its bus events, so it never applies its own
/// writes when listening.
pub struct MaintenanceStore {
    id: Uuid,
    storage: Arc<dyn StorageBackend>,
    source: Option<Arc<dyn StatusSource>>,
    bus: ChangeBus,
    state: watch::Sender<MaintenanceStatus>,
    /// Monotonic: set once by `initialize`, never cleared.
    ready: AtomicBool,
    remote_timeout: Duration,
}

impl MaintenanceStore {
    /// Create a store over the given storage, bus, and optional remote
    /// source. Without a source the store runs local-only and
    /// `api_reachable` stays false.
    ///
    /// The store starts not ready; call [`initialize`](Self::initialize)
    /// before the first gate decision.
    #[must_use]
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        bus: ChangeBus,
        source: Option<Arc<dyn StatusSource>>,
    ) -> Self {
        let (state, _rx) = watch::channel(MaintenanceStatus::default());
        Self {
            id: Uuid::new_v4(),
            storage,
            source,
            bus,
            state,
            ready: AtomicBool::new(false),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Replace the outer bound on remote fetches.
    #[must_use]
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Id of this instance, as carried on its bus events.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Read the maintenance keys from profile storage and publish the
    /// initial state. Local I/O only — never waits on the network. Storage
    /// failure degrades silently to "not in maintenance" with the default
    /// message. Sets the ready flag.
    pub async fn initialize(&self) {
        let (enabled, message) = self.read_local().await;
        self.apply(|status| {
            status.enabled = enabled;
            status.message = message;
        });
        self.ready.store(true, Ordering::Release);
        debug!(instance = %self.id, enabled, "maintenance store initialized");
    }

    /// Whether `initialize` has completed. Monotonic: once true, stays true.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Current state, cloned.
    #[must_use]
    pub fn snapshot(&self) -> MaintenanceStatus {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes. The value current at the time of the
    /// call counts as seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MaintenanceStatus> {
        self.state.subscribe()
    }

    /// One best-effort reconciliation pass.
    ///
    /// Re-reads local storage first and applies it unconditionally, which
    /// covers a concurrent in-process writer. Then, if a remote source is
    /// configured, fetches from it under the remote timeout. On success
    /// `api_reachable` becomes true and, when the body asserts a
    /// maintenance mode, both memory and storage are overwritten with the
    /// remote values. On any failure only `api_reachable` drops to false;
    /// everything else is retained. Infallible: no failure escapes this
    /// method.
    pub async fn reconcile(&self) {
        let (enabled, message) = self.read_local().await;
        self.apply(|status| {
            status.enabled = enabled;
            status.message = message;
        });

        let Some(source) = &self.source else {
            return;
        };

        match tokio::time::timeout(self.remote_timeout, source.fetch()).await {
            Ok(Ok(remote)) => self.apply_remote(remote).await,
            Ok(Err(e)) => {
                debug!(instance = %self.id, error = %e, "maintenance reconcile failed");
                self.apply(|status| status.api_reachable = false);
            }
            Err(_) => {
                debug!(
                    instance = %self.id,
                    timeout_secs = self.remote_timeout.as_secs(),
                    "maintenance reconcile timed out"
                );
                self.apply(|status| status.api_reachable = false);
            }
        }
    }

    /// Apply a successful remote response.
    ///
    /// An absent `maintenanceMode` means the platform asserts nothing: the
    /// attempt still counts as reachable, but no state changes. A present
    /// mode overwrites memory and storage; the message rides along only
    /// when the mode field is present too.
    async fn apply_remote(&self, remote: RemoteStatus) {
        let Some(enabled) = remote.maintenance_mode else {
            self.apply(|status| status.api_reachable = true);
            return;
        };
        let message = remote.maintenance_message.filter(|m| !m.is_empty());

        self.apply(|status| {
            status.api_reachable = true;
            status.enabled = enabled;
            if let Some(message) = &message {
                status.message = message.clone();
            }
        });

        // Memory already mirrors the remote authority; storage writes are
        // best-effort and heal on a later pass if they fail now.
        let flag = if enabled { "true" } else { "false" };
        self.persist_and_publish(KEY_MAINTENANCE_ENABLED, flag).await;
        if let Some(message) = &message {
            self.persist_and_publish(KEY_MAINTENANCE_MESSAGE, message).await;
        }
    }

    /// Enable maintenance mode, optionally replacing the displayed message.
    ///
    /// Storage is written before memory so memory never claims a toggle
    /// that storage refused. Sibling instances converge through the bus
    /// events published for each written key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when a profile storage write fails;
    /// in-memory state is then left unchanged.
    pub async fn enable(&self, message: Option<&str>) -> Result<(), StoreError> {
        let message = message.filter(|m| !m.is_empty());

        self.storage.put(KEY_MAINTENANCE_ENABLED, b"true").await?;
        if let Some(message) = message {
            self.storage
                .put(KEY_MAINTENANCE_MESSAGE, message.as_bytes())
                .await?;
        }

        self.apply(|status| {
            status.enabled = true;
            if let Some(message) = message {
                status.message = message.to_owned();
            }
        });

        self.bus.publish(self.id, KEY_MAINTENANCE_ENABLED, Some("true"));
        if let Some(message) = message {
            self.bus.publish(self.id, KEY_MAINTENANCE_MESSAGE, Some(message));
        }

        info!(instance = %self.id, "maintenance mode enabled");
        Ok(())
    }

    /// Disable maintenance mode. The stored message stays in place for the
    /// next enable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when the profile storage write
    /// fails; in-memory state is then left unchanged.
    pub async fn disable(&self) -> Result<(), StoreError> {
        self.storage.put(KEY_MAINTENANCE_ENABLED, b"false").await?;
        self.apply(|status| status.enabled = false);
        self.bus.publish(self.id, KEY_MAINTENANCE_ENABLED, Some("false"));

        info!(instance = %self.id, "maintenance mode disabled");
        Ok(())
    }

    /// Apply a change-bus event originating from another instance.
    ///
    /// Updates in-memory state only; the writer already persisted the key,
    /// so writing again here would storm the backend. Unrecognized keys
    /// are ignored.
    pub fn apply_external_change(&self, key: &str, value: Option<&str>) {
        match key {
            KEY_MAINTENANCE_ENABLED => {
                let enabled = value == Some("true");
                self.apply(|status| status.enabled = enabled);
            }
            KEY_MAINTENANCE_MESSAGE => {
                let message = match value {
                    Some(m) if !m.is_empty() => m.to_owned(),
                    _ => DEFAULT_MAINTENANCE_MESSAGE.to_owned(),
                };
                self.apply(|status| status.message = message);
            }
            _ => {}
        }
    }

    /// True iff a bypass credential is present in profile storage.
    ///
    /// Presence-only: the credential is never validated here. Storage
    /// errors degrade to false.
    pub async fn can_bypass(&self) -> bool {
        match self.storage.get(KEY_BYPASS_TOKEN).await {
            Ok(Some(value)) => !value.is_empty(),
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "bypass credential read failed");
                false
            }
        }
    }

    /// Drive the reconcile schedule and the bus listener until shutdown.
    ///
    /// The first reconcile runs immediately, then on the fixed interval
    /// with no backoff: a failed pass just waits for the next tick. Bus
    /// events are applied as they arrive, except those tagged with this
    /// instance's own id. Both activities stop together when `shutdown`
    /// fires.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut changes = self.bus.subscribe();
        let mut bus_open = true;

        info!(
            instance = %self.id,
            interval_secs = interval.as_secs(),
            remote = self.source.is_some(),
            "maintenance worker started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.reconcile().await;
                }
                event = changes.recv(), if bus_open => match event {
                    Ok(change) if change.origin == self.id => {}
                    Ok(change) => {
                        self.apply_external_change(&change.key, change.value.as_deref());
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(instance = %self.id, missed, "maintenance change bus lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        bus_open = false;
                    }
                },
                _ = shutdown.changed() => {
                    info!(instance = %self.id, "maintenance worker shutting down");
                    return;
                }
            }
        }
    }

    /// Mutate state through the watch channel, notifying subscribers only
    /// when the value actually changed.
    fn apply(&self, f: impl FnOnce(&mut MaintenanceStatus)) {
        self.state.send_if_modified(|status| {
            let before = status.clone();
            f(status);
            *status != before
        });
    }

    /// Read the maintenance keys from storage. Any failure or absent key
    /// falls back to the defaults.
    async fn read_local(&self) -> (bool, String) {
        let enabled = match self.storage.get(KEY_MAINTENANCE_ENABLED).await {
            Ok(Some(value)) => value.as_slice() == b"true",
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "maintenance flag read failed");
                false
            }
        };

        let message = match self.storage.get(KEY_MAINTENANCE_MESSAGE).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(text) if !text.is_empty() => text,
                _ => DEFAULT_MAINTENANCE_MESSAGE.to_owned(),
            },
            Ok(None) => DEFAULT_MAINTENANCE_MESSAGE.to_owned(),
            Err(e) => {
                debug!(error = %e, "maintenance message read failed");
                DEFAULT_MAINTENANCE_MESSAGE.to_owned()
            }
        };

        (enabled, message)
    }

    /// Persist one key and notify siblings. Reconcile path only: a failed
    /// write is logged and skipped, and the bus stays silent for it since
    /// storage did not actually change.
    async fn persist_and_publish(&self, key: &str, value: &str) {
        match self.storage.put(key, value.as_bytes()).await {
            Ok(()) => self.bus.publish(self.id, key, Some(value)),
            Err(e) => warn!(key, error = %e, "failed to persist remote maintenance state"),
        }
    }
}

impl std::fmt::Debug for MaintenanceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceStore")
            .field("id", &self.id)
            .field("remote", &self.source.is_some())
            .finish_non_exhaustive()
    }
}
