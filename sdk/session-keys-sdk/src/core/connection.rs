use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use session_keys_state::{
    CallBatchId, CallBatchStatus, PermissionGrant, PermissionRequest, PreparedCalls,
    SendCallsRequest,
};
use std::error::Error;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Which kinds of wallet a connector may hand back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalletPreference {
    /// Only smart-contract wallets, which can honour session permissions
    #[default]
    SmartWalletOnly,
    All,
}

/// Connector selection passed to `WalletConnector::connect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorChoice {
    pub app_name: String,
    pub preference: WalletPreference,
}

impl Default for ConnectorChoice {
    fn default() -> Self {
        Self {
            app_name: crate::core::constants::APP_NAME.to_string(),
            preference: WalletPreference::SmartWalletOnly,
        }
    }
}

/// Connects to a wallet and exposes the authenticated account
#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn connect(&self, choice: &ConnectorChoice) -> Result<Address, BoxError>;
    async fn disconnect(&self) -> Result<(), BoxError>;
}

/// The wallet side of `wallet_grantPermissions`
#[async_trait]
pub trait PermissionIssuer: Send + Sync {
    async fn grant_permissions(
        &self,
        request: &PermissionRequest,
    ) -> Result<PermissionGrant, BoxError>;
}

/// Submits call batches and resolves their status.
///
/// `send_calls` lets the wallet sign interactively. `prepare_calls` and
/// `send_prepared_calls` split submission so the batch hash can be signed
/// locally by a session key instead.
#[async_trait]
pub trait CallSubmitter: Send + Sync {
    async fn send_calls(&self, request: &SendCallsRequest) -> Result<CallBatchId, BoxError>;

    async fn prepare_calls(&self, request: &SendCallsRequest) -> Result<PreparedCalls, BoxError>;

    async fn send_prepared_calls(
        &self,
        prepared: PreparedCalls,
        signature: Bytes,
    ) -> Result<CallBatchId, BoxError>;

    async fn get_calls_status(&self, id: &CallBatchId) -> Result<CallBatchStatus, BoxError>;
}
