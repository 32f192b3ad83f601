// QUORUM POLICY
//
// Derives the minimum number of independent, verified observations required
// before an update (or any cluster decision) is safe to act on, given up to
// f Byzantine participants among n. The threshold is n - f + 1: even if all
// f liars corroborate, at least n - 2f + 1 correct nodes still back the
// observation.

use crate::error::ClusterError;
use serde::{Deserialize, Serialize};

/// Cluster sizing for quorum math.
///
/// `minimum_k` is derived on demand, never cached, so it can never go stale
/// against a changed `n` or `f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumParameters {
    n: usize,
    f: usize,
}

impl QuorumParameters {
    /// Requires 0 <= f < n.
    pub fn new(n: usize, f: usize) -> Result<Self, ClusterError> {
        if n == 0 || f >= n {
            return Err(ClusterError::InvalidQuorumParameters { n, f });
        }
        Ok(QuorumParameters { n, f })
    }

    pub fn total_nodes(&self) -> usize {
        self.n
    }

    pub fn tolerated_faults(&self) -> usize {
        self.f
    }

    /// Minimum corroborating verified observations: n - f + 1.
    pub fn minimum_k(&self) -> usize {
        self.n - self.f + 1
    }

    /// The safety gate: enough independent verified observations to bound
    /// the influence of up to f Byzantine nodes.
    pub fn has_quorum(&self, verified_count: usize) -> bool {
        verified_count >= self.minimum_k()
    }
}

/// Minimum corroborating verified observations for n nodes tolerating f
/// Byzantine faults. Fails loudly on misuse (f >= n or n == 0).
pub fn minimum_k(n: usize, f: usize) -> Result<usize, ClusterError> {
    Ok(QuorumParameters::new(n, f)?.minimum_k())
}

/// Whether `verified_count` observations meet the quorum for (n, f).
pub fn has_quorum(verified_count: usize, n: usize, f: usize) -> Result<bool, ClusterError> {
    Ok(QuorumParameters::new(n, f)?.has_quorum(verified_count))
}
