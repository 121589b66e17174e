use std::fmt;

use super::Node;
use super::NodePool;
use super::NodePoolGroup;

/// Which priority tier produced a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    /// Zone-balanced removal from non-preemptible capacity.
    NonPreemptible,
    /// Plain oldest-first removal from preemptible capacity.
    Preemptible,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPreemptible => f.write_str("non-preemptible"),
            Self::Preemptible => f.write_str("preemptible"),
        }
    }
}

/// The single node chosen for retirement this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection<'a> {
    pub pool: &'a NodePool,
    pub node: &'a Node,
    pub tier: Tier,
}

/// Picks at most one node out of an eligible group.
///
/// The tiers are a strict priority: the first non-preemptible pool is used
/// when it is above its floor, and only otherwise does the selector look at
/// preemptible pools.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeSelector;

impl NodeSelector {
    pub fn new() -> Self {
        Self
    }

    pub fn select<'a>(&self, group: &'a NodePoolGroup) -> Option<Selection<'a>> {
        self.non_preemptible(group)
            .or_else(|| self.preemptible(group))
    }

    fn non_preemptible<'a>(&self, group: &'a NodePoolGroup) -> Option<Selection<'a>> {
        let pool = group.pool_with_preemptible(false)?;
        if pool.is_minimum_nodes() {
            return None;
        }
        pool.max_age_node_with_balance().map(|node| Selection {
            pool,
            node,
            tier: Tier::NonPreemptible,
        })
    }

    fn preemptible<'a>(&self, group: &'a NodePoolGroup) -> Option<Selection<'a>> {
        let pool = group.pool_with_preemptible(true)?;
        pool.max_age_node().map(|node| Selection {
            pool,
            node,
            tier: Tier::Preemptible,
        })
    }
}
