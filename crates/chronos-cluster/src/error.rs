use chronos_clock::NodeId;
use thiserror::Error;

/// Cluster-level errors: membership misuse and quorum-math misuse.
///
/// Per-delivery outcomes (bad signature, stale update) are NOT errors;
/// they live in [`crate::propagation::DeliveryResult`]. A hostile signer is
/// an expected condition, not a bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// A node with this ID is already registered.
    #[error("node {0} already registered")]
    DuplicateNode(NodeId),

    /// The operation names a node that is not registered.
    #[error("node {0} is not registered")]
    UnknownNode(NodeId),

    /// Quorum parameters violate 0 <= f < n.
    #[error("invalid quorum parameters: n={n}, f={f} (requires f < n and n > 0)")]
    InvalidQuorumParameters { n: usize, f: usize },
}
