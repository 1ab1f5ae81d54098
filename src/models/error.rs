use thiserror::Error;

use crate::db::store::StoreError;
use crate::models::messages::MAX_CONTENT_CHARS;

/// Errors raised while handling real-time channel events.
///
/// Only `AuthenticationInvalid` ever terminates a connection, and only at
/// handshake time. Everything else is unicast to the originating client
/// and the connection stays open.
#[derive(Debug, Error)]
pub enum WsError {
    #[error("invalid authentication token")]
    AuthenticationInvalid,

    #[error("access denied")]
    AccessDenied,

    #[error("document not found or expired")]
    NotFound,

    #[error("document exceeds maximum limit of {limit} characters")]
    PayloadTooLarge { limit: usize },

    #[error("failed to persist document change")]
    PersistenceFailure(#[from] StoreError),
}

impl WsError {
    /// The message delivered to the originating client.
    ///
    /// NotFound is reported with the same wording as AccessDenied so the
    /// real-time channel does not leak whether a document exists.
    pub fn client_message(&self) -> String {
        match self {
            WsError::AuthenticationInvalid => "Invalid authentication token".to_string(),
            WsError::AccessDenied | WsError::NotFound => "Access denied".to_string(),
            WsError::PayloadTooLarge { limit } => {
                format!("Document exceeds maximum limit of {} characters", limit)
            }
            WsError::PersistenceFailure(_) => "Failed to save document".to_string(),
        }
    }

    pub fn payload_too_large() -> Self {
        WsError::PayloadTooLarge {
            limit: MAX_CONTENT_CHARS,
        }
    }
}
