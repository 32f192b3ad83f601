// CLUSTER NODE
//
// A node exclusively owns its logical clock and signing identity. Fault
// flags (Byzantine, isolated) are static injection fixed at creation; the
// Byzantine flag is consulted ONLY by the node's own signing decision, never
// by peers. Correct nodes learn about faults through failed verification and
// quorum counting, not through privileged introspection.

use chrono::Utc;
use chronos_clock::{NodeId, VectorClock};
use chronos_crypto::{ClockUpdate, CryptoError, NodeIdentity, VerifyingKey};
use log::debug;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;

/// A participant in the cluster.
pub struct Node {
    id: NodeId,

    /// This node's view of every node's latest timestamp.
    /// Serialized under the node's own lock; cross-node delivery never holds
    /// two clock locks at once.
    clock: Mutex<VectorClock>,

    identity: NodeIdentity,

    /// Whether this node lies when signing (fixed at creation).
    is_byzantine: bool,

    /// Creation-time isolation flag. The membership partition table is the
    /// authoritative cluster-wide fact; this flag only seeds it.
    is_isolated: bool,

    /// IDs of directly linked nodes (non-owning).
    neighbors: RwLock<BTreeSet<NodeId>>,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_byzantine(&self) -> bool {
        self.is_byzantine
    }

    pub fn is_isolated(&self) -> bool {
        self.is_isolated
    }

    /// Public key peers use to verify this node's updates.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.identity.verifying_key()
    }

    /// Snapshot of the neighbor set.
    pub fn neighbors(&self) -> BTreeSet<NodeId> {
        self.neighbors.read().clone()
    }

    pub fn set_neighbors<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        *self.neighbors.write() = ids.into_iter().map(Into::into).collect();
    }

    pub fn add_neighbor(&self, id: impl Into<NodeId>) {
        self.neighbors.write().insert(id.into());
    }

    /// Snapshot of this node's current clock.
    pub fn clock(&self) -> VectorClock {
        self.clock.lock().clone()
    }

    /// Latest timestamp this node has observed for `node_id` (0 if never).
    pub fn observed(&self, node_id: &str) -> i64 {
        self.clock.lock().get(node_id)
    }

    /// Max-merge an observation into this node's clock.
    /// Returns true if the entry advanced.
    pub(crate) fn merge_observation(&self, node_id: &str, timestamp: i64) -> bool {
        self.clock.lock().merge(node_id, timestamp)
    }

    /// Announce this node's progress as a signed clock update.
    ///
    /// The timestamp is wall-clock derived but never repeats: a second
    /// announcement within the same second still advances past the last one.
    /// Honest nodes sign the transmitted timestamp; a Byzantine node signs a
    /// different timestamp than it transmits, a lie only verification can
    /// catch.
    pub fn produce_update(&self) -> ClockUpdate {
        let timestamp = {
            let mut clock = self.clock.lock();
            let timestamp = Utc::now().timestamp().max(clock.get(&self.id) + 1);
            clock.merge(&self.id, timestamp);
            timestamp
        };

        if self.is_byzantine {
            debug!(
                "node {} (byzantine) transmitting t={} signed over t={}",
                self.id,
                timestamp,
                timestamp + 1
            );
            ClockUpdate::new(self.id.clone(), timestamp, self.identity.sign_claim(timestamp + 1))
        } else {
            self.identity.sign_update(timestamp)
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("is_byzantine", &self.is_byzantine)
            .field("is_isolated", &self.is_isolated)
            .field("neighbors", &self.neighbors.read())
            .finish()
    }
}

/// Create a node with a fresh identity and an empty clock.
pub fn create_node(
    id: impl Into<NodeId>,
    is_byzantine: bool,
    is_isolated: bool,
) -> Result<Node, CryptoError> {
    let id = id.into();
    let identity = NodeIdentity::generate(id.clone())?;

    Ok(Node {
        id,
        clock: Mutex::new(VectorClock::new()),
        identity,
        is_byzantine,
        is_isolated,
        neighbors: RwLock::new(BTreeSet::new()),
    })
}
