use std::fmt;

use super::Node;

/// The only node pool lifecycle status considered stable.
pub const STATUS_RUNNING: &str = "RUNNING";

/// A named, homogeneous group of nodes managed by the cloud provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodePool {
    pub name: String,
    pub autoscale: bool,
    /// Minimum node count per zone.
    pub min_node_count: u32,
    pub preemptible: bool,
    /// Free-text lifecycle status as reported by the provider.
    pub status: String,
    /// One instance group URL per zone the pool spans.
    pub zone_urls: Vec<String>,
    /// Inventory nodes belonging to this pool, in inventory order.
    pub nodes: Vec<Node>,
}

impl NodePool {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Replace `nodes` with the projection of `inventory` onto this pool.
    ///
    /// Cloud providers must build every pool through this so that the node
    /// list always reflects the inventory of the current cycle.
    pub fn with_inventory(self, inventory: &[Node]) -> Self {
        let nodes = inventory
            .iter()
            .filter(|node| node.pool == self.name)
            .cloned()
            .collect();
        Self { nodes, ..self }
    }

    /// Stable lifecycle status and every node ready.
    pub fn all_green(&self) -> bool {
        self.status == STATUS_RUNNING && self.nodes.iter().all(|node| node.ready)
    }

    pub fn ready_nodes(&self) -> usize {
        self.nodes.iter().filter(|node| node.ready).count()
    }

    /// Lowest ready-node count the pool may be reduced to.
    pub fn floor(&self) -> usize {
        self.min_node_count as usize * self.zone_urls.len()
    }

    /// The pool is at or below its floor and must not shrink further.
    pub fn is_minimum_nodes(&self) -> bool {
        self.ready_nodes() <= self.floor()
    }

    /// The oldest node; equal ages resolve to the first one in node order.
    pub fn max_age_node(&self) -> Option<&Node> {
        oldest(&self.nodes)
    }

    /// The oldest node of the most populated zone.
    ///
    /// Zones are considered in the order they are first seen, so when two
    /// zones hold the same number of nodes the earlier one wins.
    pub fn max_age_node_with_balance(&self) -> Option<&Node> {
        let (_, nodes) = self
            .zone_partitions()
            .into_iter()
            .reduce(|largest, zone| {
                if zone.1.len() > largest.1.len() {
                    zone
                } else {
                    largest
                }
            })?;
        oldest(nodes)
    }

    /// Nodes grouped by zone, zones in first-seen order.
    pub fn zone_partitions(&self) -> Vec<(&str, Vec<&Node>)> {
        let mut partitions: Vec<(&str, Vec<&Node>)> = Vec::new();
        for node in &self.nodes {
            match partitions
                .iter_mut()
                .find(|(zone, _)| *zone == node.zone.as_str())
            {
                Some((_, nodes)) => nodes.push(node),
                None => partitions.push((node.zone.as_str(), vec![node])),
            }
        }
        partitions
    }
}

fn oldest<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<&'a Node> {
    nodes.into_iter().reduce(|oldest, node| {
        if node.age > oldest.age {
            node
        } else {
            oldest
        }
    })
}

/// Pools considered together for one purge decision, in configured order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodePoolGroup {
    pub pools: Vec<NodePool>,
}

impl NodePoolGroup {
    pub fn new(pools: Vec<NodePool>) -> Self {
        Self { pools }
    }

    /// First pool whose preemptible flag matches.
    pub fn pool_with_preemptible(&self, preemptible: bool) -> Option<&NodePool> {
        self.pools
            .iter()
            .find(|pool| pool.preemptible == preemptible)
    }

    pub fn all_green(&self) -> bool {
        self.pools.iter().all(NodePool::all_green)
    }

    /// Names of the pools failing [`NodePool::all_green`].
    pub fn unhealthy(&self) -> Vec<&str> {
        self.pools
            .iter()
            .filter(|pool| !pool.all_green())
            .map(|pool| pool.name.as_str())
            .collect()
    }
}

impl fmt::Display for NodePoolGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .pools
            .iter()
            .map(|pool| pool.name.as_str())
            .collect::<Vec<_>>();
        write!(f, "[{}]", names.join(","))
    }
}
