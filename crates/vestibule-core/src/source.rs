//! Remote status source contract.
//!
//! The platform API is an external collaborator consumed through exactly one
//! endpoint: `GET {api_base}/maintenance/status`. This module defines the
//! wire shape of that endpoint and the trait the store reconciles against;
//! the HTTP implementation lives in the server crate so this crate stays
//! transport-free.

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Wire shape of the platform maintenance status endpoint.
///
/// Both fields are optional. An absent `maintenanceMode` means "no change";
/// `maintenanceMessage` only takes effect when `maintenanceMode` is also
/// present. Unknown fields in the body are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStatus {
    /// Authoritative maintenance flag, when the platform chooses to assert one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_mode: Option<bool>,
    /// Message accompanying the flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_message: Option<String>,
}

/// A source of authoritative maintenance state.
///
/// Implementations own their transport and client-side timeout. The store
/// wraps every `fetch` call in an outer timeout of its own, so a misbehaving
/// implementation can never stall a reconcile tick.
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync + 'static {
    /// Fetch the platform's current maintenance state.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on timeout, transport failure, a non-success
    /// response, or a body that does not parse.
    async fn fetch(&self) -> Result<RemoteStatus, SourceError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn full_body_parses() {
        let status: RemoteStatus =
            serde_json::from_str(r#"{"maintenanceMode":true,"maintenanceMessage":"Back at noon"}"#)
                .unwrap();
        assert_eq!(status.maintenance_mode, Some(true));
        assert_eq!(status.maintenance_message.as_deref(), Some("Back at noon"));
    }

    #[test]
    fn empty_body_means_no_change() {
        let status: RemoteStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(status.maintenance_mode, None);
        assert_eq!(status.maintenance_message, None);
    }

    #[test]
    fn mode_without_message_parses() {
        let status: RemoteStatus = serde_json::from_str(r#"{"maintenanceMode":false}"#).unwrap();
        assert_eq!(status.maintenance_mode, Some(false));
        assert_eq!(status.maintenance_message, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let status: RemoteStatus =
            serde_json::from_str(r#"{"maintenanceMode":true,"version":"2.1.0","region":"eu"}"#)
                .unwrap();
        assert_eq!(status.maintenance_mode, Some(true));
    }
}
