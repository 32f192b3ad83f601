// NODE IDENTITY
//
// Each node owns exactly one ed25519 key pair. The private half never leaves
// this type; peers verify against the distributable verifying key.

use crate::update::{canonical_digest, ClockUpdate};
use chronos_clock::NodeId;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// The entropy source or signing backend failed; fatal to node creation.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}

/// A node's signing identity.
///
/// SAFETY: the signing key is private to this struct. The only exported
/// artifacts are the verifying key and detached signatures.
pub struct NodeIdentity {
    node_id: NodeId,
    signing_key: SigningKey,
}

impl NodeIdentity {
    /// Generate a fresh identity for `node_id`.
    pub fn generate(node_id: impl Into<NodeId>) -> Result<Self, CryptoError> {
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;

        Ok(NodeIdentity {
            node_id: node_id.into(),
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// The distributable public half of this identity.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Detached signature over the claim "this node observed `timestamp`".
    ///
    /// Signing a timestamp other than the one placed in the transmitted
    /// update is exactly how a Byzantine node lies; verification is what
    /// catches it.
    pub fn sign_claim(&self, timestamp: i64) -> Vec<u8> {
        let digest = canonical_digest(&self.node_id, timestamp);
        self.signing_key.sign(&digest).to_bytes().to_vec()
    }

    /// Produce an honestly signed update for `timestamp`.
    pub fn sign_update(&self, timestamp: i64) -> ClockUpdate {
        let signature = self.sign_claim(timestamp);
        ClockUpdate::new(self.node_id.clone(), timestamp, signature)
    }
}

impl std::fmt::Debug for NodeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.debug_struct("NodeIdentity")
            .field("node_id", &self.node_id)
            .field("public_key", &hex::encode(self.verifying_key().as_bytes()))
            .finish()
    }
}
