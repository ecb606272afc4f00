//! Error types for secret and key index operations

use thiserror::Error;

/// Errors that can occur while talking to the credential store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("failed to unmarshal key index {content:?}: {source}")]
    Deserialization {
        content: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to marshal key index: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("keychain error for '{service}': {message}")]
    Keychain { service: String, message: String },

    #[error("missing key")]
    MissingKey,

    #[error("missing secret")]
    MissingSecret,

    #[error("key '{0}' is reserved for the key index")]
    ReservedKey(String),
}

impl StoreError {
    pub fn keychain(service: &str, message: impl ToString) -> Self {
        StoreError::Keychain {
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    /// The requested secret or index does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Input was rejected before reaching the keychain
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::MissingKey | StoreError::MissingSecret | StoreError::ReservedKey(_)
        )
    }
}

/// Convenience result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
