pub mod identity;
pub mod update;

pub use ed25519_dalek::VerifyingKey;
pub use identity::{CryptoError, NodeIdentity};
pub use update::{canonical_digest, verify_update, ClockUpdate};
