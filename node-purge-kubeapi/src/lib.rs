use std::fmt;
use std::time::SystemTime;

use kube::api;
use node_purge::BoxError;
use node_purge::ClusterOps;
use node_purge::Node;
use node_purge::NodeInventoryProvider;
use node_purge::PodRef;
use node_purge_ext as k8s;

use k8s::corev1;
use k8s::NodeExt as _;
use k8s::PodExt as _;

/// Cluster collaborator backed by the Kubernetes API.
pub struct KubeApi {
    list_params: api::ListParams,
    post_params: api::PostParams,
    delete_params: api::DeleteParams,
    client: kube::Client,
}

impl KubeApi {
    /// Connect with the local kubeconfig when `local` is set, otherwise
    /// with the in-cluster service account.
    pub async fn new(local: bool) -> Result<Self, BoxError> {
        let config = if local {
            let options = kube::config::KubeConfigOptions::default();
            kube::Config::from_kubeconfig(&options).await?
        } else {
            kube::Config::incluster()?
        };
        let client = kube::Client::try_from(config)?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: kube::Client) -> Self {
        Self {
            list_params: api::ListParams::default(),
            post_params: api::PostParams::default(),
            delete_params: api::DeleteParams::default(),
            client,
        }
    }

    /// Every Node object in the cluster, pool member or not.
    pub async fn list_node_objects(&self) -> kube::Result<Vec<corev1::Node>> {
        let lp = self.list_params();
        self.nodes().list(lp).await.map(|list| list.items)
    }

    /// Pods bound to `node` across all namespaces.
    pub async fn list_node_pods(&self, node: &str) -> kube::Result<Vec<corev1::Pod>> {
        let lp = self
            .list_params()
            .clone()
            .fields(&format!("spec.nodeName={node}"));
        self.pods().list(&lp).await.map(|list| list.items)
    }

    /// Preferred `policy` group version, provided the core API serves
    /// `pods/eviction`.
    pub async fn discover_eviction_version(&self) -> kube::Result<Option<String>> {
        let groups = self.client.list_api_groups().await?;
        let Some(version) = groups
            .groups
            .iter()
            .find(|group| group.name == k8s::POLICY_API_GROUP)
            .and_then(|group| group.preferred_version.as_ref())
            .map(|preferred| preferred.group_version.clone())
        else {
            return Ok(None);
        };

        let core = self.client.list_core_api_resources("v1").await?;
        let served = core.resources.iter().any(|resource| {
            resource.name == k8s::POD_EVICTION_RESOURCE && resource.kind == k8s::EVICTION_KIND
        });
        Ok(served.then_some(version))
    }

    pub async fn evict(&self, pod: &PodRef, version: &str) -> kube::Result<()> {
        let data = eviction(pod, version);
        let pp = self.post_params();
        self.pods_in(&pod.namespace)
            .create_subresource::<_, serde_json::Value>(k8s::EVICTION_SUBRESOURCE, &pod.name, pp, &data)
            .await
            .map(|_| ())
    }

    fn nodes(&self) -> api::Api<corev1::Node> {
        api::Api::all(self.client.clone())
    }

    fn pods(&self) -> api::Api<corev1::Pod> {
        api::Api::all(self.client.clone())
    }

    fn pods_in(&self, namespace: &str) -> api::Api<corev1::Pod> {
        api::Api::namespaced(self.client.clone(), namespace)
    }

    fn list_params(&self) -> &api::ListParams {
        &self.list_params
    }

    fn post_params(&self) -> &api::PostParams {
        &self.post_params
    }

    fn delete_params(&self) -> &api::DeleteParams {
        &self.delete_params
    }
}

/// Eviction request body for `pod` in the given policy group version.
fn eviction(pod: &PodRef, version: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": version,
        "kind": k8s::EVICTION_KIND,
        "metadata": {
            "name": pod.name,
            "namespace": pod.namespace,
        },
    })
}

impl NodeInventoryProvider for KubeApi {
    async fn list_nodes(&self, now: SystemTime) -> Result<Vec<Node>, BoxError> {
        let nodes = self
            .list_node_objects()
            .await?
            .iter()
            .filter_map(|node| node.to_purge_node(now))
            .collect::<Vec<_>>();
        tracing::debug!(count = nodes.len(), "Listed node pool members");
        Ok(nodes)
    }
}

impl ClusterOps for KubeApi {
    async fn is_unschedulable(&self, node: &str) -> Result<bool, BoxError> {
        let node = self.nodes().get(node).await?;
        Ok(node.is_unschedulable())
    }

    async fn set_unschedulable(&self, node: &str, unschedulable: bool) -> Result<(), BoxError> {
        if unschedulable {
            self.nodes().cordon(node).await?;
        } else {
            self.nodes().uncordon(node).await?;
        }
        Ok(())
    }

    async fn eviction_version(&self) -> Result<Option<String>, BoxError> {
        Ok(self.discover_eviction_version().await?)
    }

    async fn list_pods(&self, node: &str) -> Result<Vec<PodRef>, BoxError> {
        let pods = self
            .list_node_pods(node)
            .await?
            .iter()
            .filter_map(|pod| pod.pod_ref())
            .collect();
        Ok(pods)
    }

    async fn evict_pod(&self, pod: &PodRef, version: &str) -> Result<(), BoxError> {
        Ok(self.evict(pod, version).await?)
    }

    async fn delete_node(&self, node: &str) -> Result<(), BoxError> {
        let dp = self.delete_params();
        let _deleted = self.nodes().delete(node, dp).await?;
        tracing::debug!(node, "Deleted node object");
        Ok(())
    }
}

impl fmt::Debug for KubeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeApi")
            .field("list_params", &self.list_params)
            .field("post_params", &self.post_params)
            .field("delete_params", &self.delete_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}
