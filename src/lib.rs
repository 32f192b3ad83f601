//! chronos: a model of a small distributed cluster exchanging signed
//! logical-clock updates under Byzantine faults and network partitions.
//!
//! The crates compose bottom-up:
//! - [`chronos_clock`]: vector clocks and the causal partial order.
//! - [`chronos_crypto`]: per-node identities and signed clock updates.
//! - [`chronos_cluster`]: membership with a directed-edge partition table,
//!   verify-then-merge propagation, and the quorum safety gate.
//!
//! No consensus protocol lives here: the model establishes how many correct
//! signed observations are required and what comparing two logical clocks
//! means, nothing more.

pub use chronos_clock::{ClockOrdering, NodeId, VectorClock};
pub use chronos_cluster::{
    create_node, has_quorum, minimum_k, propagate, receive, ClusterError, ClusterMembership,
    Delivery, DeliveryResult, Node, QuorumParameters,
};
pub use chronos_crypto::{canonical_digest, verify_update, ClockUpdate, CryptoError, NodeIdentity};
