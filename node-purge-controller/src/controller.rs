use std::time::Duration;

use node_purge::Clock;
use node_purge::CloudPoolProvider;
use node_purge::ClusterOps;
use node_purge::NodeInventoryProvider;
use node_purge::NodeSelector;
use node_purge::PurgeError;
use node_purge::SystemClock;

use super::evaluator::representatives;
use super::CancelSignal;
use super::CycleOutcome;
use super::GroupEvaluation;
use super::NodePoolGroupEvaluator;
use super::PurgeOrchestrator;
use super::step::Step;

/// Entry point running one purge cycle at a time.
///
/// Cycles against the same cluster must not overlap; the controller does
/// not coordinate concurrent callers.
#[derive(Debug)]
pub struct PurgeController<K, C, T = SystemClock> {
    cluster: K,
    cloud: C,
    clock: T,
    selector: NodeSelector,
    step_timeout: Option<Duration>,
}

impl<K, C> PurgeController<K, C> {
    pub fn new(cluster: K, cloud: C) -> Self {
        Self {
            cluster,
            cloud,
            clock: SystemClock,
            selector: NodeSelector::new(),
            step_timeout: None,
        }
    }
}

impl<K, C, T> PurgeController<K, C, T>
where
    K: NodeInventoryProvider + ClusterOps,
    C: CloudPoolProvider,
    T: Clock,
{
    pub fn with_clock<U: Clock>(self, clock: U) -> PurgeController<K, C, U> {
        PurgeController {
            cluster: self.cluster,
            cloud: self.cloud,
            clock,
            selector: self.selector,
            step_timeout: self.step_timeout,
        }
    }

    pub fn step_timeout(self, limit: impl Into<Option<Duration>>) -> Self {
        Self {
            step_timeout: limit.into(),
            ..self
        }
    }

    pub fn cluster(&self) -> &K {
        &self.cluster
    }

    /// Run one cycle for the group formed by `pools`.
    pub async fn run_cycle(
        &self,
        cluster: &str,
        pools: &[String],
    ) -> Result<CycleOutcome, PurgeError> {
        self.run_cycle_until(cluster, pools, CancelSignal::never())
            .await
    }

    /// Like [`run_cycle`](Self::run_cycle), aborting outstanding calls once
    /// `cancel` fires. A node caught mid-drain is rolled back.
    pub async fn run_cycle_until(
        &self,
        cluster: &str,
        pools: &[String],
        cancel: CancelSignal,
    ) -> Result<CycleOutcome, PurgeError> {
        if pools.is_empty() {
            tracing::debug!("No node pools configured");
            return Ok(CycleOutcome::Idle);
        }

        let step = Step::new(self.step_timeout, cancel.clone());
        let now = self.clock.now();
        let inventory = step
            .run(self.cluster.list_nodes(now))
            .await
            .map_err(PurgeError::ListNodes)?;
        if inventory.is_empty() {
            tracing::info!(cluster, "No node pool members found");
            return Ok(CycleOutcome::Idle);
        }

        let representatives = representatives(&inventory);
        let evaluation = NodePoolGroupEvaluator::new(&self.cloud)
            .step_timeout(self.step_timeout)
            .cancel_on(cancel.clone())
            .evaluate(cluster, pools, &inventory, &representatives)
            .await?;
        let group = match evaluation {
            GroupEvaluation::Eligible(group) => group,
            GroupEvaluation::Unhealthy { pools, .. } => {
                return Ok(CycleOutcome::Unhealthy { pools });
            }
        };

        let Some(selection) = self.selector.select(&group) else {
            tracing::info!(%group, "No purgeable node");
            return Ok(CycleOutcome::NoCandidate);
        };
        tracing::info!(
            node = %selection.node.name,
            pool = %selection.pool.name,
            tier = %selection.tier,
            age = ?selection.node.age,
            "Selected node"
        );

        let node = selection.node.clone();
        PurgeOrchestrator::new(&self.cluster, &self.cloud)
            .step_timeout(self.step_timeout)
            .cancel_on(cancel)
            .purge(cluster, &node)
            .await?;
        Ok(CycleOutcome::Purged(node))
    }
}
