pub mod advanced;
pub mod basic;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

pub use crate::advanced::backends::SubmissionBackend;
pub use crate::basic::flow::SessionFlow;
pub use crate::core::config::SessionConfig;
pub use crate::core::connection::{
    BoxError, CallSubmitter, ConnectorChoice, PermissionIssuer, WalletConnector, WalletPreference,
};
pub use crate::core::rpc::JsonRpcWallet;
pub use crate::core::signer::{P256SessionKey, SessionSigner};
pub use crate::error::{Result, SessionError};
pub use crate::types::{Controls, FlowPhase, FlowSnapshot};

pub mod state {
    pub use session_keys_state::{
        Call, CallBatchId, CallBatchStatus, CallStatus, PermissionContext, PermissionGrant,
        PermissionRequest, PolicyEntry, PreparedCalls, Receipt, SendCallsRequest, SignerKey,
    };
}
