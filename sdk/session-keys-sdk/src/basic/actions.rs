use alloy_primitives::{Address, U64};
use session_keys_state::{
    Call, Capabilities, PaymasterService, PermissionContext, PermissionRequest, PermissionsCapability,
    PolicyEntry, SendCallsRequest, SignerDescriptor, SignerKey, SEND_CALLS_VERSION,
};

use crate::core::constants::{DEFAULT_CHAIN_ID, DEFAULT_PERMISSION_EXPIRY};
use crate::error::{Result, SessionError};

pub struct GrantPermissionsBuilder {
    account: Address,
    chain_id: u64,
    expiry: u64,
    signer: Option<SignerKey>,
    policies: Vec<PolicyEntry>,
}

impl GrantPermissionsBuilder {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            chain_id: DEFAULT_CHAIN_ID,
            expiry: DEFAULT_PERMISSION_EXPIRY,
            signer: None,
            policies: Vec::new(),
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_expiry(mut self, expiry: u64) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_signer(mut self, public_key: SignerKey) -> Self {
        self.signer = Some(public_key);
        self
    }

    pub fn with_policies(mut self, policies: Vec<PolicyEntry>) -> Self {
        self.policies = policies;
        self
    }

    pub fn build(self) -> Result<PermissionRequest> {
        let signer = self
            .signer
            .ok_or_else(|| SessionError::InvalidRequest("Session signer required".into()))?;
        if self.policies.is_empty() {
            return Err(SessionError::InvalidRequest(
                "At least one policy required".into(),
            ));
        }

        Ok(PermissionRequest {
            address: self.account,
            chain_id: U64::from(self.chain_id),
            expiry: self.expiry,
            signer: SignerDescriptor::secp256r1(signer),
            permissions: self.policies,
        })
    }
}

pub struct SendCallsBuilder {
    from: Address,
    chain_id: u64,
    calls: Vec<Call>,
    context: Option<PermissionContext>,
    paymaster_url: Option<String>,
}

impl SendCallsBuilder {
    pub fn new(from: Address) -> Self {
        Self {
            from,
            chain_id: DEFAULT_CHAIN_ID,
            calls: Vec::new(),
            context: None,
            paymaster_url: None,
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn add_call(mut self, call: Call) -> Self {
        self.calls.push(call);
        self
    }

    pub fn with_permission_context(mut self, context: PermissionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_paymaster(mut self, url: Option<String>) -> Self {
        self.paymaster_url = url;
        self
    }

    pub fn build(self) -> Result<SendCallsRequest> {
        if self.calls.is_empty() {
            return Err(SessionError::InvalidRequest("At least one call required".into()));
        }
        let context = self
            .context
            .ok_or_else(|| SessionError::InvalidRequest("Permission context required".into()))?;

        Ok(SendCallsRequest {
            version: SEND_CALLS_VERSION.to_string(),
            chain_id: U64::from(self.chain_id),
            from: self.from,
            calls: self.calls,
            capabilities: Capabilities {
                permissions: Some(PermissionsCapability { context }),
                paymaster_service: self.paymaster_url.map(|url| PaymasterService { url }),
            },
        })
    }
}
