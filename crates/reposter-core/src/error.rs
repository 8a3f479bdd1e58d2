//! Error types for the relay

use thiserror::Error;

use crate::Identity;

/// Relay errors
#[derive(Error, Debug)]
pub enum ReposterError {
    // Storage errors
    #[error("failed to read routing table from {origin}: {reason}")]
    StorageRead { origin: String, reason: String },

    #[error("routing table at {origin} is malformed: {reason}")]
    StorageMalformed { origin: String, reason: String },

    #[error("failed to write routing table to {origin}: {reason}")]
    StorageWrite { origin: String, reason: String },

    // Command errors
    #[error("missing identity argument")]
    MissingArgument,

    #[error("invalid identity: {0:?}")]
    InvalidIdentity(String),

    // Delivery errors
    #[error("delivery to {sink} failed: {reason}")]
    DeliveryFailed { sink: Identity, reason: String },

    // Transport errors
    #[error("transport error: {0}")]
    TransportError(String),

    #[error("transport closed")]
    TransportClosed,
}

impl ReposterError {
    /// Persisted state could not be read or written
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ReposterError::StorageRead { .. }
                | ReposterError::StorageMalformed { .. }
                | ReposterError::StorageWrite { .. }
        )
    }
}

/// Result type for relay operations
pub type ReposterResult<T> = Result<T, ReposterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let storage = ReposterError::StorageWrite {
            origin: "config.json".into(),
            reason: "read-only file system".into(),
        };
        assert!(storage.is_storage());
        assert!(!ReposterError::MissingArgument.is_storage());
        assert!(!ReposterError::TransportClosed.is_storage());
    }

    #[test]
    fn test_delivery_message_names_sink() {
        let err = ReposterError::DeliveryFailed {
            sink: Identity(200),
            reason: "chat not found".into(),
        };
        assert_eq!(err.to_string(), "delivery to 200 failed: chat not found");
    }
}
