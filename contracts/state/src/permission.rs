//! Permission request and grant types.
//!
//! A request names the account being delegated, the chain, an expiry, the
//! session signer and the policies that bound what the signer may do. The
//! wallet answers with an opaque context that must accompany every call
//! made under the grant.

use alloy_primitives::{keccak256, Address, Bytes, B256, B512, U64};
use serde::{Deserialize, Serialize};

use crate::{error::StateError, policy::PolicyEntry};

/// Uncompressed secp256r1 public key as affine coordinates `x || y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignerKey(pub B512);

impl SignerKey {
    pub const LEN: usize = 64;

    /// Build from `x || y`, or from the SEC1 uncompressed form `0x04 || x || y`
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StateError> {
        let raw = match bytes.len() {
            Self::LEN => bytes,
            65 if bytes[0] == 0x04 => &bytes[1..],
            len => {
                return Err(StateError::InvalidPublicKey(format!(
                    "expected 64 or 65 bytes, got {len}"
                )))
            },
        };
        Ok(Self(B512::from_slice(raw)))
    }

    /// SEC1 uncompressed encoding, `0x04 || x || y`
    pub fn to_sec1_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = 0x04;
        out[1..].copy_from_slice(self.0.as_slice());
        out
    }
}

/// Key algorithm of a session signer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Secp256r1,
}

/// `signer` field of a permission request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SignerDescriptor {
    /// A raw keypair held by the application
    Key {
        #[serde(rename = "type")]
        key_type: KeyType,
        #[serde(rename = "publicKey")]
        public_key: SignerKey,
    },
}

impl SignerDescriptor {
    pub fn secp256r1(public_key: SignerKey) -> Self {
        Self::Key {
            key_type: KeyType::Secp256r1,
            public_key,
        }
    }

    pub fn public_key(&self) -> &SignerKey {
        match self {
            Self::Key { public_key, .. } => public_key,
        }
    }
}

/// Payload submitted to the permission issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    /// Account being delegated
    pub address: Address,
    pub chain_id: U64,
    /// Unix timestamp after which the grant is void
    pub expiry: u64,
    pub signer: SignerDescriptor,
    /// Scopes of the grant, in request order
    pub permissions: Vec<PolicyEntry>,
}

/// Opaque authorization token returned by the wallet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionContext(pub Bytes);

impl PermissionContext {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Scope identifier passed to `callWithPermission`
    pub fn scope_hash(&self) -> B256 {
        keccak256(&self.0)
    }
}

/// A granted permission: the wallet's context plus the scopes it was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    pub context: PermissionContext,
    pub account: Address,
    pub chain_id: u64,
    pub expiry: u64,
    pub signer: SignerKey,
    pub policies: Vec<PolicyEntry>,
}

impl PermissionGrant {
    /// Bind a context returned by the wallet to the request that produced it
    pub fn from_request(request: &PermissionRequest, context: PermissionContext) -> Self {
        Self {
            context,
            account: request.address,
            chain_id: request.chain_id.to::<u64>(),
            expiry: request.expiry,
            signer: *request.signer.public_key(),
            policies: request.permissions.clone(),
        }
    }

    /// Whether the grant was issued for this account on this chain
    pub fn is_bound_to(&self, account: Address, chain_id: u64) -> bool {
        self.account == account && self.chain_id == chain_id
    }
}
