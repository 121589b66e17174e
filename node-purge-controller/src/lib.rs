//! Purge cycle driver.
//!
//! A cycle lists the node inventory, evaluates one node pool group, selects at
//! most one node and drives it through cordon, drain and delete.

use node_purge::Node;

pub use cancel::CancelHandle;
pub use cancel::CancelSignal;
pub use controller::PurgeController;
pub use evaluator::GroupEvaluation;
pub use evaluator::NodePoolGroupEvaluator;
pub use orchestrator::PurgeOrchestrator;
pub use orchestrator::PurgeState;

mod cancel;
mod controller;
mod evaluator;
mod orchestrator;
mod step;

/// What a cycle ended with when it did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No pool names configured, or the cluster has no pool nodes.
    Idle,
    /// At least one pool of the group is not healthy.
    Unhealthy { pools: Vec<String> },
    /// Every pool is at its floor or empty.
    NoCandidate,
    /// The node was drained, deleted and its instance terminated.
    Purged(Node),
}

impl CycleOutcome {
    pub fn purged(&self) -> Option<&Node> {
        match self {
            Self::Purged(node) => Some(node),
            _ => None,
        }
    }
}

#[cfg(test)]
mod fake;
