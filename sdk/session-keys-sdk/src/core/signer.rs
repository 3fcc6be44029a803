use alloy_primitives::{Bytes, B256};
use async_trait::async_trait;
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use session_keys_state::SignerKey;

/// Abstraction for a key that can authorize calls under a permission grant.
/// This allows the SDK to work with:
/// 1. In-memory session keys generated by the application
/// 2. Hardware or platform keystores that only expose a signing callback
#[async_trait]
pub trait SessionSigner: Send + Sync {
    fn public_key(&self) -> SignerKey;

    /// Sign a 32-byte prehash, returning the signature the wallet expects.
    async fn sign_hash(&self, hash: &B256) -> Result<Bytes, String>;
}

/// A secp256r1 session key held in memory only.
///
/// There is deliberately no way to serialize or clone the private half.
pub struct P256SessionKey {
    signing_key: SigningKey,
}

impl P256SessionKey {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }

    /// ECDSA over the prehash, low-S normalized, encoded as `r || s`
    pub fn sign_prehash(&self, hash: &B256) -> Result<Signature, p256::ecdsa::Error> {
        let signature: Signature = self.signing_key.sign_prehash(hash.as_slice())?;
        Ok(signature.normalize_s().unwrap_or(signature))
    }
}

impl std::fmt::Debug for P256SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("P256SessionKey")
            .field("public_key", &self.public_key().0)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionSigner for P256SessionKey {
    fn public_key(&self) -> SignerKey {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        // Uncompressed SEC1 is always 65 bytes; strip the 0x04 tag
        SignerKey(alloy_primitives::B512::from_slice(&point.as_bytes()[1..]))
    }

    async fn sign_hash(&self, hash: &B256) -> Result<Bytes, String> {
        let signature = self.sign_prehash(hash).map_err(|e| e.to_string())?;
        Ok(Bytes::copy_from_slice(&signature.to_bytes()))
    }
}
