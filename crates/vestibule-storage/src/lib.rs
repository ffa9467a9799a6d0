//! Profile storage abstraction for Vestibule.
//!
//! This crate defines the [`StorageBackend`] trait — a flat key-value
//! storage interface that knows nothing about maintenance state, sessions,
//! or gating. The maintenance store and credential store in `vestibule-core`
//! sit on top of a storage backend and give its keys meaning.
//!
//! Two implementations are provided:
//!
//! - [`RedbBackend`] — persistent profile storage, backed by redb
//!   (feature `redb-backend`, on by default)
//! - [`MemoryBackend`] — in-memory, for tests and ephemeral profiles

mod error;
mod memory;
#[cfg(feature = "redb-backend")]
mod redb_backend;

pub use error::StorageError;
pub use memory::MemoryBackend;
#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;

/// A pluggable key-value profile storage backend.
///
/// Keys are flat UTF-8 strings (e.g. `maintenanceEnabled`, `token`) —
/// the layout mirrors the web client's local-storage keys, so a profile
/// written by one front end stays readable by another. Values are opaque
/// byte arrays; the domain layer encodes them as UTF-8 strings.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a key-value pair, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. This is idempotent — deleting a non-existent key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the underlying backend fails.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`. Backends may override this with a more efficient check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }
}
