use std::collections::HashMap;
use std::time::Duration;

use node_purge::CloudPoolProvider;
use node_purge::Node;
use node_purge::NodePoolGroup;
use node_purge::PurgeError;

use super::CancelSignal;
use super::step::Step;

/// Result of judging one node pool group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupEvaluation {
    /// Every pool is healthy; the group may lose a node.
    Eligible(NodePoolGroup),
    /// Some pools are unhealthy and the whole group sits this cycle out.
    Unhealthy {
        group: NodePoolGroup,
        pools: Vec<String>,
    },
}

/// Assembles a [`NodePoolGroup`] from live pool state and applies the
/// all-or-nothing health gate.
#[derive(Debug)]
pub struct NodePoolGroupEvaluator<'a, C> {
    cloud: &'a C,
    step: Step,
}

impl<'a, C> NodePoolGroupEvaluator<'a, C>
where
    C: CloudPoolProvider,
{
    pub fn new(cloud: &'a C) -> Self {
        Self {
            cloud,
            step: Step::default(),
        }
    }

    /// Bound each pool fetch by `limit`.
    pub fn step_timeout(self, limit: impl Into<Option<Duration>>) -> Self {
        let step = self.step.timeout(limit.into());
        Self { step, ..self }
    }

    pub fn cancel_on(self, cancel: CancelSignal) -> Self {
        let step = self.step.cancel_on(cancel);
        Self { step, ..self }
    }

    /// Pools without an entry in `representatives` have no nodes and are
    /// left out of the group without querying the provider.
    pub async fn evaluate(
        &self,
        cluster: &str,
        pool_names: &[String],
        inventory: &[Node],
        representatives: &HashMap<&str, &Node>,
    ) -> Result<GroupEvaluation, PurgeError> {
        let mut pools = Vec::with_capacity(pool_names.len());
        for name in pool_names {
            if !representatives.contains_key(name.as_str()) {
                tracing::debug!(pool = %name, "Skipping node pool without nodes");
                continue;
            }
            let pool = self
                .step
                .run(self.cloud.fetch_node_pool(cluster, name, inventory))
                .await
                .map_err(|source| PurgeError::FetchNodePool {
                    pool: name.clone(),
                    source,
                })?;
            pools.push(pool);
        }

        let group = NodePoolGroup::new(pools);
        tracing::info!(%group, "Processing node pool group");

        let unhealthy = group
            .unhealthy()
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if unhealthy.is_empty() {
            return Ok(GroupEvaluation::Eligible(group));
        }
        for pool in &unhealthy {
            tracing::info!(pool = %pool, "Skipped: node pool is unhealthy");
        }
        Ok(GroupEvaluation::Unhealthy {
            group,
            pools: unhealthy,
        })
    }
}

/// First node seen for each pool, in inventory order.
pub(crate) fn representatives(inventory: &[Node]) -> HashMap<&str, &Node> {
    let mut index = HashMap::new();
    for node in inventory {
        index.entry(node.pool.as_str()).or_insert(node);
    }
    index
}
