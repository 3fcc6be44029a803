use session_keys_state::StateError;
use thiserror::Error;

/// SDK-specific error types for session-key operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// Wallet connection refused or no connector available
    #[error("Connector error: {0}")]
    Connector(String),

    /// Permission request declined or rejected by the wallet
    #[error("Permission issuer error: {0}")]
    Issuer(String),

    /// Call submission or status lookup failed
    #[error("Submission error: {0}")]
    Submission(String),

    /// Local signing with the session key failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// No account is connected
    #[error("No account connected")]
    NotConnected,

    /// A call was attempted without a granted permission
    #[error("No permission granted for this session")]
    NoGrant,

    /// A submission is already in flight
    #[error("A call submission is already in flight")]
    Busy,

    /// A permission request is already in flight
    #[error("A permission request is already in flight")]
    PermissionPending,

    /// The previous call batch has not reached a terminal status
    #[error("Call batch {0} is still pending")]
    BatchPending(String),

    /// The session was invalidated while the request was in flight
    #[error("Response discarded: session changed while {0} was in flight")]
    Stale(&'static str),

    /// A request could not be assembled
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// JSON-RPC error object returned by the wallet
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Wire type encoding error
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Malformed configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SessionError>;
