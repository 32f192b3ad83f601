// UPDATE PROPAGATION
//
// Best-effort single-hop fan-out of a signed clock update along the
// membership graph. A blocked directed edge is an expected environmental
// condition and is skipped silently; a bad signature is an expected hostile
// condition and is reported as a delivery outcome, never as an error.
// Multi-hop re-propagation is a caller decision, not done here.
//
// LOCK ORDER: membership state is read and released before a recipient's
// clock lock is taken. No path holds two node locks at once.

use crate::membership::ClusterMembership;
use crate::node::Node;
use chronos_clock::NodeId;
use chronos_crypto::{verify_update, ClockUpdate, VerifyingKey};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of delivering one update to one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryResult {
    /// Signature verified and the clock entry advanced.
    Applied,

    /// Signature missing, malformed, forged, or over different content.
    RejectedBadSignature,

    /// Signature verified but the timestamp does not advance the stored one.
    RejectedStale,
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryResult::Applied => write!(f, "APPLIED"),
            DeliveryResult::RejectedBadSignature => write!(f, "REJECTED_BAD_SIGNATURE"),
            DeliveryResult::RejectedStale => write!(f, "REJECTED_STALE"),
        }
    }
}

/// One recipient's outcome within a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: NodeId,
    pub result: DeliveryResult,
}

/// Deliver an update to a single node.
///
/// Verification runs against the ORIGIN's public key (the node named in the
/// update), not the forwarding sender: the assertion being checked is
/// "update.node_id observed update.timestamp". Only a verified update is
/// merged, so forged and replayed messages never move a clock.
pub fn receive(update: &ClockUpdate, at_node: &Node, origin_key: &VerifyingKey) -> DeliveryResult {
    if !verify_update(origin_key, update) {
        warn!(
            "node {} rejected {} from {}: bad signature",
            at_node.id(),
            update,
            update.node_id()
        );
        return DeliveryResult::RejectedBadSignature;
    }

    if at_node.merge_observation(update.node_id(), update.timestamp()) {
        debug!("node {} applied {}", at_node.id(), update);
        DeliveryResult::Applied
    } else {
        debug!("node {} rejected {} as stale", at_node.id(), update);
        DeliveryResult::RejectedStale
    }
}

/// Fan an update out to `from`'s neighbors, one hop, best effort.
///
/// Neighbors behind a blocked directed edge `from -> neighbor` (or a fully
/// isolated endpoint) are skipped without a delivery record. An origin with
/// no registered public key cannot be corroborated, so its update is
/// rejected at every recipient.
pub fn propagate(
    update: &ClockUpdate,
    from: &Node,
    membership: &ClusterMembership,
) -> Vec<Delivery> {
    let origin_key = membership.verifying_key_of(update.node_id());
    let mut deliveries = Vec::new();

    for neighbor in from.neighbors() {
        if membership.is_link_blocked(from.id(), &neighbor) {
            debug!("link {} -> {} blocked, skipping", from.id(), neighbor);
            continue;
        }

        let Some(recipient) = membership.node(&neighbor) else {
            debug!("neighbor {} of {} not registered, skipping", neighbor, from.id());
            continue;
        };

        let result = match &origin_key {
            Some(key) => receive(update, &recipient, key),
            None => {
                warn!(
                    "node {} rejected {}: origin {} has no registered key",
                    recipient.id(),
                    update,
                    update.node_id()
                );
                DeliveryResult::RejectedBadSignature
            }
        };

        deliveries.push(Delivery {
            recipient: neighbor,
            result,
        });
    }

    deliveries
}
