//! Recording stand-ins for the cluster and cloud collaborators.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;

use node_purge::BoxError;
use node_purge::Clock;
use node_purge::CloudPoolProvider;
use node_purge::ClusterOps;
use node_purge::Node;
use node_purge::NodeInventoryProvider;
use node_purge::NodePool;
use node_purge::PodRef;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    ListNodes,
    FetchNodePool(String),
    IsUnschedulable(String),
    Cordon(String),
    Uncordon(String),
    EvictionVersion,
    ListPods(String),
    Evict(String),
    DeleteNode(String),
    DeleteInstance(String),
}

impl Call {
    pub(crate) fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Cordon(_)
                | Self::Uncordon(_)
                | Self::Evict(_)
                | Self::DeleteNode(_)
                | Self::DeleteInstance(_)
        )
    }
}

/// Call log shared by both fakes so ordering across them is visible.
#[derive(Clone, Debug, Default)]
pub(crate) struct Journal {
    calls: Arc<Mutex<Vec<Call>>>,
    failing: Arc<Mutex<Vec<Call>>>,
    hanging: Arc<Mutex<Vec<Call>>>,
}

impl Journal {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn mutating(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_mutating)
            .collect()
    }

    /// Make `call` fail every time it is made.
    pub(crate) fn fail(&self, call: Call) {
        self.failing.lock().unwrap().push(call);
    }

    /// Make `call` never complete.
    pub(crate) fn hang(&self, call: Call) {
        self.hanging.lock().unwrap().push(call);
    }

    async fn record(&self, call: Call) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push(call.clone());
        let hangs = self.hanging.lock().unwrap().contains(&call);
        if hangs {
            std::future::pending::<()>().await;
        }
        let fails = self.failing.lock().unwrap().contains(&call);
        if fails {
            return Err(format!("injected failure: {call:?}").into());
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct FakeCluster {
    pub(crate) journal: Journal,
    nodes: Vec<Node>,
    pods: Vec<PodRef>,
    eviction_version: Option<String>,
    unschedulable: Mutex<HashSet<String>>,
    /// Someone else uncordons the node while its pods are listed.
    external_uncordon: bool,
}

impl FakeCluster {
    pub(crate) fn new(journal: &Journal, nodes: Vec<Node>) -> Self {
        Self {
            journal: journal.clone(),
            nodes,
            pods: Vec::new(),
            eviction_version: Some("policy/v1".to_string()),
            unschedulable: Mutex::default(),
            external_uncordon: false,
        }
    }

    pub(crate) fn pods(self, pods: Vec<PodRef>) -> Self {
        Self { pods, ..self }
    }

    pub(crate) fn without_eviction_api(self) -> Self {
        Self {
            eviction_version: None,
            ..self
        }
    }

    pub(crate) fn external_uncordon(self) -> Self {
        Self {
            external_uncordon: true,
            ..self
        }
    }

    pub(crate) fn cordoned(&self, node: &str) -> bool {
        self.unschedulable.lock().unwrap().contains(node)
    }
}

impl NodeInventoryProvider for FakeCluster {
    async fn list_nodes(&self, _now: SystemTime) -> Result<Vec<Node>, BoxError> {
        self.journal.record(Call::ListNodes).await?;
        Ok(self.nodes.clone())
    }
}

impl ClusterOps for FakeCluster {
    async fn is_unschedulable(&self, node: &str) -> Result<bool, BoxError> {
        self.journal
            .record(Call::IsUnschedulable(node.to_string()))
            .await?;
        Ok(self.cordoned(node))
    }

    async fn set_unschedulable(&self, node: &str, unschedulable: bool) -> Result<(), BoxError> {
        let call = if unschedulable {
            Call::Cordon(node.to_string())
        } else {
            Call::Uncordon(node.to_string())
        };
        self.journal.record(call).await?;
        let mut cordoned = self.unschedulable.lock().unwrap();
        if unschedulable {
            cordoned.insert(node.to_string());
        } else {
            cordoned.remove(node);
        }
        Ok(())
    }

    async fn eviction_version(&self) -> Result<Option<String>, BoxError> {
        self.journal.record(Call::EvictionVersion).await?;
        Ok(self.eviction_version.clone())
    }

    async fn list_pods(&self, node: &str) -> Result<Vec<PodRef>, BoxError> {
        self.journal.record(Call::ListPods(node.to_string())).await?;
        if self.external_uncordon {
            self.unschedulable.lock().unwrap().remove(node);
        }
        Ok(self.pods.clone())
    }

    async fn evict_pod(&self, pod: &PodRef, _version: &str) -> Result<(), BoxError> {
        self.journal.record(Call::Evict(pod.to_string())).await
    }

    async fn delete_node(&self, node: &str) -> Result<(), BoxError> {
        self.journal.record(Call::DeleteNode(node.to_string())).await
    }
}

/// Serves fixed pool metadata, projected onto the inventory it is given.
#[derive(Debug)]
pub(crate) struct FakeCloud {
    journal: Journal,
    pools: Vec<NodePool>,
}

impl FakeCloud {
    pub(crate) fn new(journal: &Journal, pools: Vec<NodePool>) -> Self {
        Self {
            journal: journal.clone(),
            pools,
        }
    }
}

impl CloudPoolProvider for FakeCloud {
    async fn fetch_node_pool(
        &self,
        _cluster: &str,
        pool: &str,
        inventory: &[Node],
    ) -> Result<NodePool, BoxError> {
        self.journal
            .record(Call::FetchNodePool(pool.to_string()))
            .await?;
        let metadata = self
            .pools
            .iter()
            .find(|candidate| candidate.name == pool)
            .cloned()
            .ok_or_else(|| format!("node pool {pool} not found"))?;
        Ok(metadata.with_inventory(inventory))
    }

    async fn delete_instance(&self, _cluster: &str, node: &Node) -> Result<(), BoxError> {
        self.journal
            .record(Call::DeleteInstance(node.name.clone()))
            .await
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct FixedClock(pub(crate) SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}
