use std::fmt;
use std::time::Duration;

use node_purge::CloudPoolProvider;
use node_purge::ClusterOps;
use node_purge::Node;
use node_purge::PurgeError;
use node_purge::Rollback;
use node_purge::StepError;

use super::CancelSignal;
use super::step::Step;

/// Where a node stands in the purge sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurgeState {
    Ready,
    Cordoned,
    Drained,
    Deleted,
}

impl fmt::Display for PurgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Ready => "ready",
            Self::Cordoned => "cordoned",
            Self::Drained => "drained",
            Self::Deleted => "deleted",
        };
        f.write_str(state)
    }
}

/// Drives one node through cordon, drain and delete.
///
/// No step is retried. A failed drain or node deletion is compensated by
/// uncordoning the node, and the outcome of that compensation is carried in
/// the returned error. The uncordon itself ignores cancellation but still
/// honours the step timeout.
#[derive(Debug)]
pub struct PurgeOrchestrator<'a, K, C> {
    cluster: &'a K,
    cloud: &'a C,
    step: Step,
}

impl<'a, K, C> PurgeOrchestrator<'a, K, C>
where
    K: ClusterOps,
    C: CloudPoolProvider,
{
    pub fn new(cluster: &'a K, cloud: &'a C) -> Self {
        Self {
            cluster,
            cloud,
            step: Step::default(),
        }
    }

    /// Bound every collaborator call by `limit`.
    pub fn step_timeout(self, limit: impl Into<Option<Duration>>) -> Self {
        let step = self.step.timeout(limit.into());
        Self { step, ..self }
    }

    pub fn cancel_on(self, cancel: CancelSignal) -> Self {
        let step = self.step.cancel_on(cancel);
        Self { step, ..self }
    }

    pub async fn purge(&self, cluster: &str, node: &Node) -> Result<(), PurgeError> {
        tracing::info!(node = %node.name, pool = %node.pool, zone = %node.zone, "Purging node");

        self.apply_cordon(&node.name, true)
            .await
            .map_err(|source| PurgeError::Cordon {
                node: node.name.clone(),
                source,
            })?;
        transition(node, PurgeState::Ready, PurgeState::Cordoned);

        if let Err(source) = self.drain(&node.name).await {
            tracing::warn!(node = %node.name, error = %source, "Drain failed, rolling back");
            let rollback = self.rollback(&node.name).await;
            return Err(PurgeError::Drain {
                node: node.name.clone(),
                source,
                rollback,
            });
        }
        transition(node, PurgeState::Cordoned, PurgeState::Drained);

        if let Err(source) = self.delete(&node.name).await {
            tracing::warn!(node = %node.name, error = %source, "Delete failed, rolling back");
            let rollback = self.rollback(&node.name).await;
            return Err(PurgeError::Delete {
                node: node.name.clone(),
                source,
                rollback,
            });
        }

        self.step.run(self.cloud.delete_instance(cluster, node))
            .await
            .map_err(|source| PurgeError::DeleteInstance {
                node: node.name.clone(),
                source,
            })?;
        transition(node, PurgeState::Drained, PurgeState::Deleted);

        tracing::info!(node = %node.name, pool = %node.pool, "Purged node");
        Ok(())
    }

    /// Set the node's schedulability, skipping the write when it already
    /// matches.
    async fn apply_cordon(&self, node: &str, cordon: bool) -> Result<(), StepError> {
        let action = if cordon { "cordon" } else { "uncordon" };
        let unschedulable = self.step.run(self.cluster.is_unschedulable(node)).await?;
        if unschedulable == cordon {
            tracing::info!(node, "Already {action}ed");
            return Ok(());
        }
        self.step.run(self.cluster.set_unschedulable(node, cordon))
            .await?;
        tracing::info!(node, "Applied {action}");
        Ok(())
    }

    async fn drain(&self, node: &str) -> Result<(), StepError> {
        let version = self
            .step
            .run(self.cluster.eviction_version())
            .await?
            .ok_or(StepError::EvictionUnsupported)?;
        let pods = self.step.run(self.cluster.list_pods(node)).await?;
        tracing::debug!(node, count = pods.len(), %version, "Evicting pods");

        for pod in &pods {
            self.step.run(self.cluster.evict_pod(pod, &version))
                .await
                .map_err(|err| match err {
                    StepError::Api(source) => StepError::Evict {
                        pod: pod.clone(),
                        source,
                    },
                    other => other,
                })?;
            tracing::info!(node, pod = %pod, "Evicted pod");
        }
        Ok(())
    }

    async fn delete(&self, node: &str) -> Result<(), StepError> {
        if !self.step.run(self.cluster.is_unschedulable(node)).await? {
            return Err(StepError::NotCordoned);
        }
        self.step.run(self.cluster.delete_node(node)).await?;
        tracing::info!(node, "Deleted node");
        Ok(())
    }

    async fn rollback(&self, node: &str) -> Rollback {
        let restore = Self {
            cluster: self.cluster,
            cloud: self.cloud,
            step: self.step.uncancellable(),
        };
        match restore.apply_cordon(node, false).await {
            Ok(()) => {
                tracing::info!(node, "Rolled back to ready");
                Rollback::Restored
            }
            Err(err) => {
                tracing::error!(node, error = %err, "Rollback failed, node may stay cordoned");
                Rollback::Failed(err)
            }
        }
    }

}

fn transition(node: &Node, from: PurgeState, to: PurgeState) {
    tracing::debug!(node = %node.name, %from, %to, "Purge state transition");
}
