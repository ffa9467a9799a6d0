//! Error types for `vestibule-core`.
//!
//! Read-path failures never surface to a viewer: the store absorbs them and
//! degrades to safe defaults. Only the administrative write path returns
//! errors, so an operator sees when a toggle did not persist.

use vestibule_storage::StorageError;

/// Errors from profile-backed write operations (maintenance toggles and
/// session credentials).
///
/// Writers persist before touching memory; when storage refuses the write
/// this error is returned and in-memory state is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying profile storage backend returned an error.
    #[error("profile storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from a remote status source.
///
/// All variants are equivalent to the store: any of them means "this
/// reconciliation attempt failed, keep prior state, mark the API
/// unreachable".
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The request did not complete within the client-side timeout.
    #[error("remote status request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The endpoint answered with a non-success status code.
    #[error("remote status endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// The request failed before a response arrived.
    #[error("remote status request failed: {reason}")]
    Network { reason: String },

    /// The response body was not the expected JSON shape.
    #[error("remote status body malformed: {reason}")]
    Malformed { reason: String },
}
