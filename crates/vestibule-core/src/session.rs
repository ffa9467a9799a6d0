//! Presence-only session credentials.
//!
//! The shell never validates tokens. A credential present in profile storage
//! means "logged in" for routing purposes; authenticity, expiry, and
//! signature checks belong to the platform backend the pages call. Two keys
//! are managed: the session token and the maintenance bypass credential.

use std::sync::Arc;

use tracing::debug;
use vestibule_storage::StorageBackend;

use crate::error::StoreError;
use crate::status::{KEY_BYPASS_TOKEN, KEY_SESSION_TOKEN};

/// Reads and writes the presence-only credentials in profile storage.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn StorageBackend>,
}

impl CredentialStore {
    /// Create a credential store over the given profile storage.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Persist a session token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when the write fails.
    pub async fn store_session(&self, token: &str) -> Result<(), StoreError> {
        self.storage.put(KEY_SESSION_TOKEN, token.as_bytes()).await?;
        Ok(())
    }

    /// Remove the session token. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when the delete fails.
    pub async fn clear_session(&self) -> Result<(), StoreError> {
        self.storage.delete(KEY_SESSION_TOKEN).await?;
        Ok(())
    }

    /// True iff a non-empty session token is present. Storage errors
    /// degrade to false.
    pub async fn has_session(&self) -> bool {
        self.present(KEY_SESSION_TOKEN).await
    }

    /// Persist a maintenance bypass credential.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when the write fails.
    pub async fn store_bypass(&self, token: &str) -> Result<(), StoreError> {
        self.storage.put(KEY_BYPASS_TOKEN, token.as_bytes()).await?;
        Ok(())
    }

    /// Remove the bypass credential. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when the delete fails.
    pub async fn clear_bypass(&self) -> Result<(), StoreError> {
        self.storage.delete(KEY_BYPASS_TOKEN).await?;
        Ok(())
    }

    /// True iff a non-empty bypass credential is present. Storage errors
    /// degrade to false.
    pub async fn has_bypass(&self) -> bool {
        self.present(KEY_BYPASS_TOKEN).await
    }

    async fn present(&self, key: &str) -> bool {
        match self.storage.get(key).await {
            Ok(Some(value)) => !value.is_empty(),
            Ok(None) => false,
            Err(e) => {
                debug!(key, error = %e, "credential read failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vestibule_storage::MemoryBackend;

    use super::*;

    fn make_credentials() -> (MemoryBackend, CredentialStore) {
        let storage = MemoryBackend::new();
        let credentials = CredentialStore::new(Arc::new(storage.clone()));
        (storage, credentials)
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let (_storage, credentials) = make_credentials();
        assert!(!credentials.has_session().await);

        credentials.store_session("opaque-session").await.unwrap();
        assert!(credentials.has_session().await);

        credentials.clear_session().await.unwrap();
        assert!(!credentials.has_session().await);
    }

    #[tokio::test]
    async fn bypass_lifecycle() {
        let (_storage, credentials) = make_credentials();
        assert!(!credentials.has_bypass().await);

        credentials.store_bypass("opaque-bypass").await.unwrap();
        assert!(credentials.has_bypass().await);

        credentials.clear_bypass().await.unwrap();
        assert!(!credentials.has_bypass().await);
    }

    #[tokio::test]
    async fn tokens_are_independent() {
        let (_storage, credentials) = make_credentials();

        credentials.store_session("s").await.unwrap();
        assert!(credentials.has_session().await);
        assert!(!credentials.has_bypass().await);

        credentials.store_bypass("b").await.unwrap();
        credentials.clear_session().await.unwrap();
        assert!(!credentials.has_session().await);
        assert!(credentials.has_bypass().await);
    }

    #[tokio::test]
    async fn empty_token_counts_as_absent() {
        let (_storage, credentials) = make_credentials();
        credentials.store_session("").await.unwrap();
        assert!(!credentials.has_session().await);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let (_storage, credentials) = make_credentials();
        credentials.clear_session().await.unwrap();
        credentials.clear_bypass().await.unwrap();
    }

    #[tokio::test]
    async fn presence_check_reads_storage_written_elsewhere() {
        let (storage, credentials) = make_credentials();
        storage.put(KEY_SESSION_TOKEN, b"external").await.unwrap();
        assert!(credentials.has_session().await);
    }
}
