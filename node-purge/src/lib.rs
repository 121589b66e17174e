//! Node pool model and the purge decision policy.
//!
//! Everything in this crate is pure: the types are rebuilt from live queries on
//! every cycle and the predicates never touch the network. Collaborators that
//! do (the cluster API and the cloud provider) are described by the traits in
//! [`capability`] and implemented elsewhere.

use std::fmt;
use std::time::Duration;

pub use capability::BoxError;
pub use capability::Clock;
pub use capability::CloudPoolProvider;
pub use capability::ClusterOps;
pub use capability::NodeInventoryProvider;
pub use capability::PodRef;
pub use capability::SystemClock;
pub use error::PurgeError;
pub use error::Rollback;
pub use error::StepError;
pub use select::NodeSelector;
pub use select::Selection;
pub use select::Tier;

pub mod capability;

mod error;
mod pool;
mod select;

pub use pool::NodePool;
pub use pool::NodePoolGroup;
pub use pool::STATUS_RUNNING;

/// A cluster worker instance as seen at inventory time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Node (and backing instance) name.
    pub name: String,
    /// Name of the owning node pool.
    pub pool: String,
    /// Availability zone.
    pub zone: String,
    /// Time since creation, measured against the cycle's clock.
    pub age: Duration,
    /// Schedulable and reporting `Ready`.
    pub ready: bool,
}

impl Node {
    /// Create a not-ready node of age zero with no zone.
    pub fn new(name: impl ToString, pool: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            pool: pool.to_string(),
            zone: String::new(),
            age: Duration::ZERO,
            ready: false,
        }
    }

    pub fn zone(self, zone: impl ToString) -> Self {
        Self {
            zone: zone.to_string(),
            ..self
        }
    }

    pub fn age(self, age: Duration) -> Self {
        Self { age, ..self }
    }

    pub fn ready(self, ready: bool) -> Self {
        Self { ready, ..self }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pool, self.name)
    }
}
