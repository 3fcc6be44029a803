use alloy_primitives::{Address, Bytes, B256};
use session_keys_state::{Call, PermissionContext};

use crate::advanced::calls;
use crate::error::{Result, SessionError};

/// Wraps an inner call into the demo contract's `callWithPermission` entry
/// point. The contract receives:
/// 1. The scope identifier of the grant (`keccak256(context)`).
/// 2. A signature over the inner call.
/// 3. The inner calldata.
#[derive(Clone)]
pub struct PermissionedCallBuilder {
    contract: Address,
    permission_hash: Option<B256>,
    signature: Bytes,
    inner: Option<Bytes>,
}

impl PermissionedCallBuilder {
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            permission_hash: None,
            signature: Bytes::new(),
            inner: None,
        }
    }

    pub fn with_context(mut self, context: &PermissionContext) -> Self {
        self.permission_hash = Some(context.scope_hash());
        self
    }

    pub fn with_permission_hash(mut self, hash: B256) -> Self {
        self.permission_hash = Some(hash);
        self
    }

    pub fn with_signature(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }

    pub fn add_inner_call(mut self, inner: &Call) -> Self {
        // Only one inner call is forwarded by the contract
        self.inner = Some(inner.data.clone());
        self
    }

    pub fn build(self) -> Result<Call> {
        let permission_hash = self
            .permission_hash
            .ok_or_else(|| SessionError::InvalidRequest("Permission scope required".into()))?;
        let inner = self
            .inner
            .ok_or_else(|| SessionError::InvalidRequest("Inner call required".into()))?;

        Ok(calls::call_with_permission(
            self.contract,
            permission_hash,
            self.signature,
            inner,
        ))
    }
}
