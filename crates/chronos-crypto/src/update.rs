// SIGNED CLOCK UPDATES
//
// A ClockUpdate is the immutable assertion "node X observed logical time T",
// bound to X's key by a detached signature over the canonical byte encoding
// of (node_id, timestamp). Signing and verification MUST hash the exact same
// bytes; any change to the canonical encoding applies to both sides or every
// honest signature in the cluster stops verifying.

use chronos_clock::NodeId;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;

/// A signed assertion that a node observed a given logical time.
///
/// Immutable after creation: altering the timestamp or node ID invalidates
/// the signature, and re-signing produces a new instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockUpdate {
    node_id: NodeId,
    timestamp: i64,
    signature: Vec<u8>,
}

impl ClockUpdate {
    /// Assemble an update from its parts. An empty signature models an
    /// unsigned (and therefore unverifiable) update.
    pub fn new(node_id: impl Into<NodeId>, timestamp: i64, signature: Vec<u8>) -> Self {
        ClockUpdate {
            node_id: node_id.into(),
            timestamp,
            signature,
        }
    }

    /// An update that was never signed.
    pub fn unsigned(node_id: impl Into<NodeId>, timestamp: i64) -> Self {
        Self::new(node_id, timestamp, Vec::new())
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The digest a signature on this update must cover.
    pub fn digest(&self) -> [u8; 32] {
        canonical_digest(&self.node_id, self.timestamp)
    }
}

impl fmt::Display for ClockUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClockUpdate(node={}, t={}, sig={})",
            self.node_id,
            self.timestamp,
            if self.signature.is_empty() {
                "<none>".to_string()
            } else {
                hex::encode(&self.signature[..8.min(self.signature.len())])
            }
        )
    }
}

/// Sha3-256 digest over the canonical byte encoding of (node_id, timestamp).
pub fn canonical_digest(node_id: &str, timestamp: i64) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    // (String, i64) cannot fail to encode; fall back to a fixed marker so a
    // broken encoding can never alias a real message
    let encoded = bincode::serialize(&(node_id, timestamp))
        .unwrap_or_else(|_| b"clock_update_encoding_error".to_vec());
    hasher.update(&encoded);
    hasher.finalize().into()
}

/// Verify an update's signature against the claimed origin's public key.
///
/// Returns false, never an error: a hostile or malformed signature is an
/// expected condition. Rejects empty signatures, signatures by a different
/// key, and signatures over a different timestamp than the one transmitted.
pub fn verify_update(public_key: &VerifyingKey, update: &ClockUpdate) -> bool {
    let signature = match Signature::from_slice(update.signature()) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    public_key.verify(&update.digest(), &signature).is_ok()
}
