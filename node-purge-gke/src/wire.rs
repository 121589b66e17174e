//! Subset of the Container and Compute REST resources the purger reads.

use node_purge::Node;
use node_purge::NodePool;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClustersResponse {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolResource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: NodeConfig,
    #[serde(default)]
    pub autoscaling: Autoscaling,
    #[serde(default)]
    pub instance_group_urls: Vec<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default)]
    pub preemptible: bool,
    #[serde(default)]
    pub spot: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Autoscaling {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub min_node_count: u32,
}

/// Long-running operation returned by mutating Compute calls.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessToken {
    pub(crate) access_token: String,
}

impl NodePoolResource {
    /// Join the pool metadata with the nodes of `inventory` named `pool`.
    ///
    /// Spot VMs are treated as preemptible capacity.
    pub fn into_node_pool(self, pool: &str, inventory: &[Node]) -> NodePool {
        NodePool {
            autoscale: self.autoscaling.enabled,
            min_node_count: self.autoscaling.min_node_count,
            preemptible: self.config.preemptible || self.config.spot,
            status: self.status,
            zone_urls: self.instance_group_urls,
            ..NodePool::new(pool)
        }
        .with_inventory(inventory)
    }
}
