pub use k8s_openapi as openapi;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

pub use time::TimeExt;

use std::time::Duration;
use std::time::SystemTime;

use constcat::concat;
use node_purge::Node;
use node_purge::PodRef;

mod time;

/// Label carrying the GKE node pool name.
pub const NODE_POOL_LABEL: &str = "cloud.google.com/gke-nodepool";
/// Well-known zone label.
pub const ZONE_LABEL: &str = "topology.kubernetes.io/zone";
/// Deprecated zone label, still set on older nodes.
pub const LEGACY_ZONE_LABEL: &str = "failure-domain.beta.kubernetes.io/zone";

pub const EVICTION_KIND: &str = "Eviction";
pub const EVICTION_SUBRESOURCE: &str = "eviction";
pub const POD_EVICTION_RESOURCE: &str = concat!("pods/", EVICTION_SUBRESOURCE);
pub const POLICY_API_GROUP: &str = "policy";

pub trait NodeExt {
    fn label(&self, key: &str) -> Option<&str>;

    /// Node pool this node belongs to, if it carries the pool label.
    fn pool_name(&self) -> Option<&str> {
        self.label(NODE_POOL_LABEL)
    }

    fn zone(&self) -> Option<&str> {
        self.label(ZONE_LABEL)
            .or_else(|| self.label(LEGACY_ZONE_LABEL))
    }

    fn is_unschedulable(&self) -> bool;

    /// `Ready` condition is `True` and the node accepts new pods.
    fn is_ready(&self) -> bool;

    /// Time since creation as of `now`, zero when unknown or in the future.
    fn age_at(&self, now: SystemTime) -> Duration;

    /// Convert into the purge model; `None` for nodes outside any node pool.
    fn to_purge_node(&self, now: SystemTime) -> Option<Node>;
}

impl NodeExt for corev1::Node {
    fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()?
            .get(key)
            .map(String::as_str)
    }

    fn is_unschedulable(&self) -> bool {
        self.spec
            .as_ref()
            .and_then(|spec| spec.unschedulable)
            .unwrap_or(false)
    }

    fn is_ready(&self) -> bool {
        let ready = self
            .status
            .as_ref()
            .and_then(|status| status.conditions.as_ref())
            .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"))
            .is_some_and(|condition| condition.status == "True");
        ready && !self.is_unschedulable()
    }

    fn age_at(&self, now: SystemTime) -> Duration {
        self.metadata
            .creation_timestamp
            .as_ref()
            .and_then(|created| now.duration_since(created.to_system_time()).ok())
            .unwrap_or_default()
    }

    fn to_purge_node(&self, now: SystemTime) -> Option<Node> {
        let name = self.metadata.name.as_deref()?;
        let pool = self.pool_name()?;
        let node = Node::new(name, pool)
            .zone(self.zone().unwrap_or_default())
            .age(self.age_at(now))
            .ready(self.is_ready());
        Some(node)
    }
}

pub trait PodExt {
    fn pod_ref(&self) -> Option<PodRef>;
}

impl PodExt for corev1::Pod {
    fn pod_ref(&self) -> Option<PodRef> {
        let name = self.metadata.name.as_deref()?;
        let namespace = self.metadata.namespace.as_deref().unwrap_or("default");
        Some(PodRef::new(namespace, name))
    }
}

pub trait ObjectMetaExt {
    fn new(name: impl ToString) -> Self;
    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self;
    fn created(self, ts: impl Into<Option<metav1::Time>>) -> Self;
    fn label(self, key: impl ToString, value: impl ToString) -> Self;
}

impl ObjectMetaExt for metav1::ObjectMeta {
    fn new(name: impl ToString) -> Self {
        let name = Some(name.to_string());
        Self { name, ..default() }
    }

    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..Self::new(name)
        }
    }

    fn created(self, ts: impl Into<Option<metav1::Time>>) -> Self {
        Self {
            creation_timestamp: ts.into(),
            ..self
        }
    }

    fn label(mut self, key: impl ToString, value: impl ToString) -> Self {
        self.labels
            .get_or_insert_with(default)
            .insert(key.to_string(), value.to_string());
        self
    }
}

pub fn default<T: Default>() -> T {
    T::default()
}

#[cfg(test)]
mod tests;
