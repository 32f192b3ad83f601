pub mod error;
pub mod membership;
pub mod node;
pub mod propagation;
pub mod quorum;

pub use error::ClusterError;
pub use membership::ClusterMembership;
pub use node::{create_node, Node};
pub use propagation::{propagate, receive, Delivery, DeliveryResult};
pub use quorum::{has_quorum, minimum_k, QuorumParameters};
