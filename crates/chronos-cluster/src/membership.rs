// CLUSTER MEMBERSHIP
//
// The one piece of shared state in the model: the node registry, the current
// coordinator, and the partition table. All of it lives behind a single
// reader/writer lock; reads run concurrently, writes are exclusive.
//
// Partition state is cluster-wide and authoritative. It supports asymmetric
// links: a directed edge (from, to) can be blocked while (to, from) stays
// open, and a node can be fully isolated (no send, no receive) in one flag.

use crate::error::ClusterError;
use crate::node::Node;
use chronos_clock::NodeId;
use chronos_crypto::VerifyingKey;
use log::info;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
struct MembershipState {
    nodes: HashMap<NodeId, Arc<Node>>,

    /// Current coordinator; always refers to a registered node.
    leader: Option<NodeId>,

    /// Fully isolated nodes: neither send nor receive.
    isolated: HashSet<NodeId>,

    /// Blocked directed edges: (from, to) pairs that cannot carry traffic.
    blocked_links: HashSet<(NodeId, NodeId)>,
}

/// Shared registry of nodes, leader, and partition facts.
pub struct ClusterMembership {
    state: RwLock<MembershipState>,
}

impl ClusterMembership {
    pub fn new() -> Self {
        ClusterMembership {
            state: RwLock::new(MembershipState::default()),
        }
    }

    /// Register a node. Its creation-time isolation flag seeds the partition
    /// table, which is authoritative from then on.
    pub fn add_node(&self, node: Arc<Node>) -> Result<(), ClusterError> {
        let mut state = self.state.write();
        let id = node.id().to_string();

        if state.nodes.contains_key(&id) {
            return Err(ClusterError::DuplicateNode(id));
        }

        if node.is_isolated() {
            state.isolated.insert(id.clone());
        }
        state.nodes.insert(id.clone(), node);
        info!("registered node {}", id);
        Ok(())
    }

    /// Set the current coordinator. The leader must be a registered node.
    pub fn set_leader(&self, id: &str) -> Result<(), ClusterError> {
        let mut state = self.state.write();
        if !state.nodes.contains_key(id) {
            return Err(ClusterError::UnknownNode(id.to_string()));
        }
        state.leader = Some(id.to_string());
        info!("leader set to {}", id);
        Ok(())
    }

    pub fn leader(&self) -> Option<NodeId> {
        self.state.read().leader.clone()
    }

    /// Mark or clear full isolation for a node (no send, no receive).
    /// Partition facts are recorded regardless of registration: they describe
    /// the network, not the registry.
    pub fn set_partition(&self, id: &str, isolated: bool) {
        let mut state = self.state.write();
        if isolated {
            state.isolated.insert(id.to_string());
        } else {
            state.isolated.remove(id);
        }
        info!("node {} isolation set to {}", id, isolated);
    }

    /// Whether a node is fully isolated. Unknown IDs are not partitioned.
    pub fn is_partitioned(&self, id: &str) -> bool {
        self.state.read().isolated.contains(id)
    }

    /// Block the directed edge `from -> to` (the reverse stays open).
    pub fn block_link(&self, from: &str, to: &str) {
        self.state
            .write()
            .blocked_links
            .insert((from.to_string(), to.to_string()));
        info!("link {} -> {} blocked", from, to);
    }

    /// Reopen the directed edge `from -> to`.
    pub fn unblock_link(&self, from: &str, to: &str) {
        self.state
            .write()
            .blocked_links
            .remove(&(from.to_string(), to.to_string()));
        info!("link {} -> {} unblocked", from, to);
    }

    /// Whether traffic can NOT flow along `from -> to`. True if either
    /// endpoint is fully isolated or the directed edge itself is blocked.
    pub fn is_link_blocked(&self, from: &str, to: &str) -> bool {
        let state = self.state.read();
        state.isolated.contains(from)
            || state.isolated.contains(to)
            || state
                .blocked_links
                .contains(&(from.to_string(), to.to_string()))
    }

    pub fn node(&self, id: &str) -> Option<Arc<Node>> {
        self.state.read().nodes.get(id).cloned()
    }

    /// Public key of a registered node, for verifying its updates.
    pub fn verifying_key_of(&self, id: &str) -> Option<VerifyingKey> {
        self.state.read().nodes.get(id).map(|n| n.verifying_key())
    }

    pub fn len(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().nodes.is_empty()
    }
}

impl Default for ClusterMembership {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::create_node;

    fn member(id: &str) -> Arc<Node> {
        Arc::new(create_node(id, false, false).unwrap())
    }

    #[test]
    fn test_add_node_rejects_duplicates() {
        let membership = ClusterMembership::new();
        membership.add_node(member("a")).unwrap();
        assert_eq!(
            membership.add_node(member("a")),
            Err(ClusterError::DuplicateNode("a".to_string()))
        );
        assert_eq!(membership.len(), 1);
    }

    #[test]
    fn test_set_leader_requires_registration() {
        let membership = ClusterMembership::new();
        assert_eq!(
            membership.set_leader("a"),
            Err(ClusterError::UnknownNode("a".to_string()))
        );

        membership.add_node(member("a")).unwrap();
        membership.set_leader("a").unwrap();
        assert_eq!(membership.leader(), Some("a".to_string()));
    }

    #[test]
    fn test_unknown_node_defaults_to_not_partitioned() {
        let membership = ClusterMembership::new();
        assert!(!membership.is_partitioned("ghost"));
    }

    #[test]
    fn test_isolation_flag_seeds_partition_table() {
        let membership = ClusterMembership::new();
        membership
            .add_node(Arc::new(create_node("e", false, true).unwrap()))
            .unwrap();
        assert!(membership.is_partitioned("e"));

        membership.set_partition("e", false);
        assert!(!membership.is_partitioned("e"));
    }

    #[test]
    fn test_blocked_link_is_directional() {
        let membership = ClusterMembership::new();
        membership.add_node(member("d")).unwrap();
        membership.add_node(member("a")).unwrap();

        membership.block_link("d", "a");
        assert!(membership.is_link_blocked("d", "a"));
        assert!(!membership.is_link_blocked("a", "d"));

        membership.unblock_link("d", "a");
        assert!(!membership.is_link_blocked("d", "a"));
    }

    #[test]
    fn test_full_isolation_blocks_both_directions() {
        let membership = ClusterMembership::new();
        membership.add_node(member("d")).unwrap();
        membership.add_node(member("e")).unwrap();

        membership.set_partition("e", true);
        assert!(membership.is_link_blocked("d", "e"));
        assert!(membership.is_link_blocked("e", "d"));
    }

    #[test]
    fn test_verifying_key_lookup() {
        let membership = ClusterMembership::new();
        let node = member("a");
        let key = node.verifying_key();
        membership.add_node(node).unwrap();

        assert_eq!(membership.verifying_key_of("a"), Some(key));
        assert_eq!(membership.verifying_key_of("ghost"), None);
    }
}
