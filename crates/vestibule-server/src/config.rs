//! Server configuration for the Vestibule shell.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `VESTIBULE_*` environment variables.

use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Profile storage backend type.
    pub storage_backend: StorageBackendType,
    /// Base URL of the platform API; `None` disables remote reconciliation.
    pub api_base: Option<String>,
    /// Spacing between maintenance reconciliation attempts.
    pub reconcile_interval: Duration,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
}

/// Supported profile storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, profile lost on restart).
    Memory,
    /// Redb persistent storage.
    Redb { path: String },
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (cloud convention, binds to `0.0.0.0`)
    /// - `VESTIBULE_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8600`)
    /// - `VESTIBULE_STORAGE` — `memory` or `redb` (default: `memory`)
    /// - `VESTIBULE_STORAGE_PATH` — path for the redb backend (default: `./data`)
    /// - `VESTIBULE_API_BASE` — platform API base URL (optional; unset = local-only)
    /// - `VESTIBULE_RECONCILE_INTERVAL` — seconds between reconciliations (default: `120`)
    /// - `VESTIBULE_LOG_LEVEL` — log filter (default: `info`)
    #[must_use]
    pub fn from_env() -> Self {
        // Priority: VESTIBULE_BIND_ADDR > PORT (cloud) > default 127.0.0.1:8600
        let bind_addr = if let Ok(addr) = std::env::var("VESTIBULE_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8600)))
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(8600);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 8600))
        };

        let storage_path =
            std::env::var("VESTIBULE_STORAGE_PATH").unwrap_or_else(|_| "./data".to_owned());

        let storage_backend = match std::env::var("VESTIBULE_STORAGE")
            .unwrap_or_else(|_| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "redb" => StorageBackendType::Redb { path: storage_path },
            _ => StorageBackendType::Memory,
        };

        let api_base = std::env::var("VESTIBULE_API_BASE")
            .ok()
            .filter(|base| !base.is_empty());

        let reconcile_interval = std::env::var("VESTIBULE_RECONCILE_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(vestibule_core::store::DEFAULT_RECONCILE_INTERVAL, Duration::from_secs);

        let log_level = std::env::var("VESTIBULE_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        Self {
            bind_addr,
            storage_backend,
            api_base,
            reconcile_interval,
            log_level,
        }
    }
}
