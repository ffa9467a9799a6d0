//! Maintenance status data model and profile storage layout.
//!
//! The profile storage keys mirror the web client's local-storage layout, so
//! a profile written by one shell version stays readable by the next. Values
//! are UTF-8 strings at the backend; `maintenanceEnabled` holds the literal
//! strings `"true"` / `"false"`.

/// Storage key for the maintenance flag. Absent means "not in maintenance".
pub const KEY_MAINTENANCE_ENABLED: &str = "maintenanceEnabled";

/// Storage key for the maintenance message. Absent means the default text.
pub const KEY_MAINTENANCE_MESSAGE: &str = "maintenanceMessage";

/// Storage key for the bypass credential. Presence-only, never validated.
pub const KEY_BYPASS_TOKEN: &str = "superAdminToken";

/// Storage key for the session token. Presence-only, never validated.
pub const KEY_SESSION_TOKEN: &str = "token";

/// Message shown to blocked viewers when storage holds no message.
pub const DEFAULT_MAINTENANCE_MESSAGE: &str =
    "We are performing scheduled maintenance. Please check back soon.";

/// A point-in-time view of maintenance state.
///
/// `enabled` and `message` are always defined: defaults are substituted when
/// storage holds no value. `message` is only ever replaced, never cleared —
/// a disable call leaves the last message in place for the next enable.
/// `api_reachable` reflects the most recent remote reconciliation attempt
/// and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceStatus {
    /// Whether maintenance mode is active.
    pub enabled: bool,
    /// Human-readable text shown to blocked viewers.
    pub message: String,
    /// True only after the most recent remote reconciliation succeeded.
    pub api_reachable: bool,
}

impl Default for MaintenanceStatus {
    fn default() -> Self {
        Self {
            enabled: false,
            message: DEFAULT_MAINTENANCE_MESSAGE.to_owned(),
            api_reachable: false,
        }
    }
}
