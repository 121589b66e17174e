use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::BoxError;
use super::PodRef;

/// Failure of a single orchestration step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Api(BoxError),

    #[error("cluster does not serve the pods/eviction API")]
    EvictionUnsupported,

    #[error("failed to evict pod {pod}: {source}")]
    Evict { pod: PodRef, source: BoxError },

    #[error("node is schedulable, refusing to delete")]
    NotCordoned,

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("cancelled")]
    Cancelled,
}

/// Outcome of the compensating uncordon after a failed drain or delete.
#[derive(Debug)]
pub enum Rollback {
    /// The node was made schedulable again.
    Restored,
    /// The uncordon failed too; the node may be left cordoned.
    Failed(StepError),
}

impl Rollback {
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored)
    }
}

impl fmt::Display for Rollback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restored => f.write_str("node uncordoned"),
            Self::Failed(err) => write!(f, "uncordon also failed: {err}"),
        }
    }
}

/// Terminal failure of one purge cycle.
#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("failed to list nodes: {0}")]
    ListNodes(#[source] StepError),

    #[error("failed to fetch node pool {pool}: {source}")]
    FetchNodePool { pool: String, source: StepError },

    #[error("failed to cordon node {node}: {source}")]
    Cordon { node: String, source: StepError },

    #[error("failed to drain node {node}: {source}; {rollback}")]
    Drain {
        node: String,
        source: StepError,
        rollback: Rollback,
    },

    #[error("failed to delete node {node}: {source}; {rollback}")]
    Delete {
        node: String,
        source: StepError,
        rollback: Rollback,
    },

    #[error("failed to delete instance of node {node}: {source}")]
    DeleteInstance { node: String, source: StepError },
}

impl PurgeError {
    /// Outcome of the compensating uncordon, for failures that attempt one.
    pub fn rollback(&self) -> Option<&Rollback> {
        match self {
            Self::Drain { rollback, .. } | Self::Delete { rollback, .. } => Some(rollback),
            _ => None,
        }
    }

    /// The node's schedulability is unknown and may need an operator.
    pub fn requires_attention(&self) -> bool {
        self.rollback()
            .is_some_and(|rollback| !rollback.is_restored())
    }

    /// The step failed because the cycle was cancelled.
    pub fn is_cancelled(&self) -> bool {
        let step = match self {
            Self::ListNodes(source)
            | Self::FetchNodePool { source, .. }
            | Self::Cordon { source, .. }
            | Self::Drain { source, .. }
            | Self::Delete { source, .. }
            | Self::DeleteInstance { source, .. } => source,
        };
        matches!(step, StepError::Cancelled)
    }
}
