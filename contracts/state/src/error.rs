use thiserror::Error;

/// Errors raised while building or decoding session-key wire types
#[derive(Debug, Error)]
pub enum StateError {
    /// A policy's data could not be encoded
    #[error("Failed to encode policy {policy_type}: {source}")]
    PolicyEncoding {
        policy_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A public key had the wrong length or encoding
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// A call batch identifier could not be decoded
    #[error("Invalid call batch id {0}")]
    InvalidCallBatchId(String),
}
