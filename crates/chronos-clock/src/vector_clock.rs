// VECTOR CLOCK: per-node record of the latest observed timestamp
//
// SAFETY INVARIANTS:
// 1. Entries are monotonically non-decreasing: merge takes max, never overwrites
// 2. Absent entries are indistinguishable from 0 in every operation
// 3. Comparison is the standard vector-clock partial order, with an explicit
//    Concurrent case when neither clock dominates

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Cluster-wide node identifier.
pub type NodeId = String;

/// Outcome of comparing two vector clocks under the causal partial order.
///
/// `Concurrent` is a first-class result: two clocks where neither dominates
/// carry no causal relation, and collapsing that case into a ternary
/// less/equal/greater answer loses exactly the information this type exists
/// to preserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockOrdering {
    /// Every entry of `self` is <= the other's, at least one strictly less
    Less,

    /// Every entry of `self` is >= the other's, at least one strictly greater
    Greater,

    /// All entries match (absent entries count as 0 on both sides)
    Equal,

    /// Neither clock dominates the other
    Concurrent,
}

impl ClockOrdering {
    /// The ordering seen from the other clock's point of view.
    pub fn inverse(self) -> ClockOrdering {
        match self {
            ClockOrdering::Less => ClockOrdering::Greater,
            ClockOrdering::Greater => ClockOrdering::Less,
            ClockOrdering::Equal => ClockOrdering::Equal,
            ClockOrdering::Concurrent => ClockOrdering::Concurrent,
        }
    }
}

impl fmt::Display for ClockOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockOrdering::Less => write!(f, "LESS"),
            ClockOrdering::Greater => write!(f, "GREATER"),
            ClockOrdering::Equal => write!(f, "EQUAL"),
            ClockOrdering::Concurrent => write!(f, "CONCURRENT"),
        }
    }
}

/// A vector clock mapping node identity to the latest timestamp observed
/// for that identity.
///
/// SAFETY: the only mutation paths are `merge` and `merge_from`, both of
/// which take the pointwise maximum. A stored timestamp never regresses,
/// so replayed or stale updates cannot rewind local knowledge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClock {
    entries: HashMap<NodeId, i64>,
}

impl VectorClock {
    /// Create an empty clock (all nodes implicitly at 0).
    pub fn new() -> Self {
        VectorClock {
            entries: HashMap::new(),
        }
    }

    /// Latest timestamp observed for `node`, 0 if never observed.
    pub fn get(&self, node: &str) -> i64 {
        self.entries.get(node).copied().unwrap_or(0)
    }

    /// Record an observation of `node` at `timestamp`.
    ///
    /// Takes the maximum of the stored and incoming value. Returns true if
    /// the entry advanced, false if the observation was stale or equal.
    pub fn merge(&mut self, node: &str, timestamp: i64) -> bool {
        let current = self.get(node);
        if timestamp > current {
            self.entries.insert(node.to_string(), timestamp);
            true
        } else {
            false
        }
    }

    /// Merge another clock into this one, entry by entry.
    pub fn merge_from(&mut self, other: &VectorClock) {
        for (node, &timestamp) in &other.entries {
            self.merge(node, timestamp);
        }
    }

    /// Compare two clocks under the causal partial order.
    ///
    /// Keys missing on either side are treated as 0, so a clock that has
    /// never heard of a node compares as if it observed that node at time 0.
    pub fn compare(&self, other: &VectorClock) -> ClockOrdering {
        let mut self_ahead = false;
        let mut other_ahead = false;

        // Shared keys are visited twice by the chain; the flags are
        // idempotent so that costs nothing
        for node in self.entries.keys().chain(other.entries.keys()) {
            let ours = self.get(node);
            let theirs = other.get(node);
            if ours > theirs {
                self_ahead = true;
            } else if ours < theirs {
                other_ahead = true;
            }
        }

        match (self_ahead, other_ahead) {
            (false, false) => ClockOrdering::Equal,
            (true, false) => ClockOrdering::Greater,
            (false, true) => ClockOrdering::Less,
            (true, true) => ClockOrdering::Concurrent,
        }
    }

    /// Number of nodes with a recorded (non-zero) observation.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over recorded (node, timestamp) entries.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, i64)> {
        self.entries.iter().map(|(node, &ts)| (node, ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn clock_of(entries: &[(&str, i64)]) -> VectorClock {
        let mut clock = VectorClock::new();
        for (node, ts) in entries {
            clock.merge(node, *ts);
        }
        clock
    }

    #[test]
    fn test_absent_entry_reads_zero() {
        let clock = VectorClock::new();
        assert_eq!(clock.get("never-seen"), 0);
    }

    #[test]
    fn test_merge_advances() {
        let mut clock = VectorClock::new();
        assert!(clock.merge("a", 5));
        assert_eq!(clock.get("a"), 5);
    }

    #[test]
    fn test_merge_never_regresses() {
        let mut clock = VectorClock::new();
        clock.merge("a", 10);
        assert!(!clock.merge("a", 3));
        assert_eq!(clock.get("a"), 10);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut once = VectorClock::new();
        once.merge("a", 7);

        let mut twice = VectorClock::new();
        twice.merge("a", 7);
        twice.merge("a", 7);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_compare_equal() {
        let a = clock_of(&[("x", 1), ("y", 2)]);
        let b = clock_of(&[("x", 1), ("y", 2)]);
        assert_eq!(a.compare(&b), ClockOrdering::Equal);
    }

    #[test]
    fn test_compare_dominance() {
        let a = clock_of(&[("x", 1), ("y", 2)]);
        let b = clock_of(&[("x", 1), ("y", 5)]);
        assert_eq!(a.compare(&b), ClockOrdering::Less);
        assert_eq!(b.compare(&a), ClockOrdering::Greater);
    }

    #[test]
    fn test_compare_concurrent() {
        // a is ahead on x, b is ahead on y: no causal relation either way
        let a = clock_of(&[("x", 3), ("y", 1)]);
        let b = clock_of(&[("x", 1), ("y", 3)]);
        assert_eq!(a.compare(&b), ClockOrdering::Concurrent);
        assert_eq!(b.compare(&a), ClockOrdering::Concurrent);
    }

    #[test]
    fn test_compare_missing_key_treated_as_zero() {
        let a = clock_of(&[("x", 1)]);
        let b = clock_of(&[("x", 1), ("y", 4)]);
        assert_eq!(a.compare(&b), ClockOrdering::Less);
        assert_eq!(b.compare(&a), ClockOrdering::Greater);

        // An explicit zero entry compares equal to an absent one
        let c = clock_of(&[("x", 1)]);
        let mut d = clock_of(&[("x", 1)]);
        d.merge("y", 0); // stays absent: merge rejects non-advancing values
        assert_eq!(c.compare(&d), ClockOrdering::Equal);
    }

    #[test]
    fn test_merge_from_takes_pointwise_max() {
        let mut a = clock_of(&[("x", 3), ("y", 1)]);
        let b = clock_of(&[("x", 1), ("y", 4), ("z", 2)]);
        a.merge_from(&b);
        assert_eq!(a.get("x"), 3);
        assert_eq!(a.get("y"), 4);
        assert_eq!(a.get("z"), 2);
    }

    #[test]
    fn test_merged_clock_dominates_both_inputs() {
        let a = clock_of(&[("x", 3), ("y", 1)]);
        let b = clock_of(&[("x", 1), ("y", 4)]);
        let mut merged = a.clone();
        merged.merge_from(&b);
        assert_ne!(merged.compare(&a), ClockOrdering::Less);
        assert_ne!(merged.compare(&b), ClockOrdering::Less);
        assert_ne!(merged.compare(&a), ClockOrdering::Concurrent);
        assert_ne!(merged.compare(&b), ClockOrdering::Concurrent);
    }

    fn arb_clock() -> impl Strategy<Value = VectorClock> {
        proptest::collection::hash_map("[a-e]", 1i64..100, 0..5).prop_map(|m| {
            let mut clock = VectorClock::new();
            for (node, ts) in m {
                clock.merge(&node, ts);
            }
            clock
        })
    }

    proptest! {
        #[test]
        fn prop_compare_is_antisymmetric(a in arb_clock(), b in arb_clock()) {
            prop_assert_eq!(a.compare(&b), b.compare(&a).inverse());
        }

        #[test]
        fn prop_merge_from_is_idempotent(a in arb_clock(), b in arb_clock()) {
            let mut once = a.clone();
            once.merge_from(&b);
            let mut twice = a.clone();
            twice.merge_from(&b);
            twice.merge_from(&b);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_clock_equals_itself(a in arb_clock()) {
            prop_assert_eq!(a.compare(&a), ClockOrdering::Equal);
        }
    }
}
