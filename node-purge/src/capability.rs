//! Collaborator capabilities consumed by the purge controller.
//!
//! Implementations map their own error types into [`BoxError`]; the
//! controller wraps them with the node and stage they belong to.

use std::fmt;
use std::future::Future;
use std::time::SystemTime;

use super::Node;
use super::NodePool;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Source of the wall-clock reference used for node ages.
pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Lists every node that belongs to a recognised node pool.
pub trait NodeInventoryProvider {
    /// Ages are computed against `now`.
    fn list_nodes(&self, now: SystemTime) -> impl Future<Output = Result<Vec<Node>, BoxError>> + Send;
}

/// Cloud control plane holding node pool metadata and backing instances.
pub trait CloudPoolProvider {
    /// Fetch the pool's metadata and join it with `inventory`
    /// (see [`NodePool::with_inventory`]).
    fn fetch_node_pool(
        &self,
        cluster: &str,
        pool: &str,
        inventory: &[Node],
    ) -> impl Future<Output = Result<NodePool, BoxError>> + Send;

    /// Terminate the compute instance backing `node`.
    fn delete_instance(
        &self,
        cluster: &str,
        node: &Node,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Cluster API primitives driven by the drain/delete orchestration.
pub trait ClusterOps {
    fn is_unschedulable(&self, node: &str) -> impl Future<Output = Result<bool, BoxError>> + Send;

    fn set_unschedulable(
        &self,
        node: &str,
        unschedulable: bool,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Preferred group version of the eviction API, `None` when the cluster
    /// does not serve `pods/eviction`.
    fn eviction_version(&self) -> impl Future<Output = Result<Option<String>, BoxError>> + Send;

    /// Pods scheduled on `node`, in listing order.
    fn list_pods(&self, node: &str) -> impl Future<Output = Result<Vec<PodRef>, BoxError>> + Send;

    fn evict_pod(
        &self,
        pod: &PodRef,
        version: &str,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    fn delete_node(&self, node: &str) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Namespaced pod name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

impl PodRef {
    pub fn new(namespace: impl ToString, name: impl ToString) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
