//! Call batches submitted under a permission grant and their status.

use std::fmt;

use alloy_primitives::{hex, Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::StateError, permission::PermissionContext};

/// Version tag of the `wallet_sendCalls` payload
pub const SEND_CALLS_VERSION: &str = "1.0";

/// A single contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl Call {
    /// A call that transfers no native value
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data: data.into(),
        }
    }

    /// First four bytes of the calldata, if present
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).map(|s| [s[0], s[1], s[2], s[3]])
    }
}

/// `permissions` capability: the context of the grant authorizing the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsCapability {
    pub context: PermissionContext,
}

/// `paymasterService` capability: sponsor endpoint paying the batch fees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymasterService {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionsCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_service: Option<PaymasterService>,
}

/// Payload submitted to the call submitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCallsRequest {
    pub version: String,
    pub chain_id: U64,
    pub from: Address,
    pub calls: Vec<Call>,
    pub capabilities: Capabilities,
}

impl SendCallsRequest {
    /// Context of the grant this batch is authorized under
    pub fn permission_context(&self) -> Option<&PermissionContext> {
        self.capabilities.permissions.as_ref().map(|p| &p.context)
    }
}

/// A prepared batch awaiting a local signature.
///
/// `hash` is what the session key signs; `context` is the wallet's own
/// representation of the prepared batch and is echoed back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedCalls {
    pub hash: B256,
    #[serde(default)]
    pub context: Value,
}

/// Identifier of a submitted call batch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallBatchId(pub String);

impl CallBatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the leading 32 bytes of a hex identifier as a user-operation hash
    pub fn user_operation_hash(&self) -> Result<B256, StateError> {
        let bytes =
            hex::decode(&self.0).map_err(|_| StateError::InvalidCallBatchId(self.0.clone()))?;
        if bytes.len() < 32 {
            return Err(StateError::InvalidCallBatchId(self.0.clone()));
        }
        Ok(B256::from_slice(&bytes[..32]))
    }
}

impl fmt::Display for CallBatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a call batch as reported by the wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    Pending,
    Confirmed,
    Failed,
    /// Any status this client does not recognise
    #[serde(other)]
    Unknown,
}

impl CallStatus {
    /// Every status other than `Pending` ends polling
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: B256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<U64>,
}

/// Polled projection of a call batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBatchStatus {
    pub status: CallStatus,
    #[serde(default)]
    pub receipts: Vec<Receipt>,
}

impl CallBatchStatus {
    pub fn pending() -> Self {
        Self {
            status: CallStatus::Pending,
            receipts: Vec::new(),
        }
    }

    pub fn confirmed(receipts: Vec<Receipt>) -> Self {
        Self {
            status: CallStatus::Confirmed,
            receipts,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == CallStatus::Confirmed
    }

    /// Transaction hash of the first receipt once the batch is confirmed
    pub fn transaction_hash(&self) -> Option<B256> {
        if !self.is_confirmed() {
            return None;
        }
        self.receipts.first().map(|r| r.transaction_hash)
    }
}
