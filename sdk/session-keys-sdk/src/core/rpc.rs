//! A wallet reached over JSON-RPC 2.0, implementing every collaborator role.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use session_keys_state::{
    CallBatchId, CallBatchStatus, PermissionContext, PermissionGrant, PermissionRequest,
    PreparedCalls, SendCallsRequest,
};
use tracing::{debug, trace};

use crate::core::connection::{
    BoxError, CallSubmitter, ConnectorChoice, PermissionIssuer, WalletConnector, WalletPreference,
};
use crate::error::{Result, SessionError};

const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct GrantedPermission {
    context: PermissionContext,
}

/// `wallet_sendCalls` answers with either a bare id or `{ "id": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchIdResponse {
    Bare(CallBatchId),
    Object { id: CallBatchId },
}

impl From<BatchIdResponse> for CallBatchId {
    fn from(response: BatchIdResponse) -> Self {
        match response {
            BatchIdResponse::Bare(id) | BatchIdResponse::Object { id } => id,
        }
    }
}

pub struct JsonRpcWallet {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    account: Mutex<Option<Address>>,
}

impl JsonRpcWallet {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
            account: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Account returned by the last successful `connect`
    pub fn account(&self) -> Option<Address> {
        *self.account.lock()
    }

    fn build_request(id: u64, method: &str, params: Value) -> Value {
        json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": id,
            "method": method,
            "params": params,
        })
    }

    fn parse_response<T: DeserializeOwned>(body: Value) -> Result<T> {
        let response: RpcResponse = serde_json::from_value(body)?;
        if let Some(error) = response.error {
            return Err(SessionError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(serde_json::from_value(response.result.unwrap_or(Value::Null))?)
    }

    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = Self::build_request(id, method, params);
        trace!(%method, id, "json-rpc request");

        let response: Value = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Self::parse_response(response)
    }
}

#[async_trait]
impl WalletConnector for JsonRpcWallet {
    async fn connect(&self, choice: &ConnectorChoice) -> std::result::Result<Address, BoxError> {
        let accounts: Vec<Address> = self.request("eth_requestAccounts", json!([])).await?;
        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| SessionError::Connector("wallet returned no accounts".into()))?;

        if choice.preference == WalletPreference::SmartWalletOnly {
            let code: Bytes = self
                .request("eth_getCode", json!([account, "latest"]))
                .await?;
            if code.is_empty() {
                return Err(SessionError::Connector(format!(
                    "{account} is not a smart wallet"
                ))
                .into());
            }
        }

        *self.account.lock() = Some(account);
        debug!(%account, app = %choice.app_name, "json-rpc wallet connected");
        Ok(account)
    }

    async fn disconnect(&self) -> std::result::Result<(), BoxError> {
        self.account.lock().take();
        Ok(())
    }
}

#[async_trait]
impl PermissionIssuer for JsonRpcWallet {
    async fn grant_permissions(
        &self,
        request: &PermissionRequest,
    ) -> std::result::Result<PermissionGrant, BoxError> {
        let granted: Vec<GrantedPermission> = self
            .request("wallet_grantPermissions", json!([request]))
            .await?;
        let first = granted
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::Issuer("wallet granted no permissions".into()))?;
        Ok(PermissionGrant::from_request(request, first.context))
    }
}

#[async_trait]
impl CallSubmitter for JsonRpcWallet {
    async fn send_calls(
        &self,
        request: &SendCallsRequest,
    ) -> std::result::Result<CallBatchId, BoxError> {
        let id: BatchIdResponse = self.request("wallet_sendCalls", json!([request])).await?;
        Ok(id.into())
    }

    async fn prepare_calls(
        &self,
        request: &SendCallsRequest,
    ) -> std::result::Result<PreparedCalls, BoxError> {
        Ok(self.request("wallet_prepareCalls", json!([request])).await?)
    }

    async fn send_prepared_calls(
        &self,
        prepared: PreparedCalls,
        signature: Bytes,
    ) -> std::result::Result<CallBatchId, BoxError> {
        let params = json!([{
            "hash": prepared.hash,
            "context": prepared.context,
            "signature": signature,
        }]);
        let id: BatchIdResponse = self.request("wallet_sendPreparedCalls", params).await?;
        Ok(id.into())
    }

    async fn get_calls_status(
        &self,
        id: &CallBatchId,
    ) -> std::result::Result<CallBatchStatus, BoxError> {
        Ok(self.request("wallet_getCallsStatus", json!([id])).await?)
    }
}
