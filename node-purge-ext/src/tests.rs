use std::time::Duration;
use std::time::UNIX_EPOCH;

use super::*;

fn created_at(secs: u64) -> metav1::Time {
    metav1::Time::from_system_time(UNIX_EPOCH + Duration::from_secs(secs)).unwrap()
}

fn condition(type_: &str, status: &str) -> corev1::NodeCondition {
    corev1::NodeCondition {
        type_: type_.to_string(),
        status: status.to_string(),
        ..default()
    }
}

fn gke_node(name: &str, pool: &str) -> corev1::Node {
    corev1::Node {
        metadata: metav1::ObjectMeta::new(name)
            .label(NODE_POOL_LABEL, pool)
            .label(ZONE_LABEL, "asia-northeast1-a")
            .created(created_at(1_000)),
        status: Some(corev1::NodeStatus {
            conditions: Some(vec![
                condition("MemoryPressure", "False"),
                condition("Ready", "True"),
            ]),
            ..default()
        }),
        ..default()
    }
}

fn cordoned(mut node: corev1::Node) -> corev1::Node {
    node.spec = Some(corev1::NodeSpec {
        unschedulable: Some(true),
        ..default()
    });
    node
}

#[test]
fn converts_pool_node() {
    let now = UNIX_EPOCH + Duration::from_secs(1_600);
    let node = gke_node("gke-a-1", "pool-a").to_purge_node(now).unwrap();

    assert_eq!(node.name, "gke-a-1");
    assert_eq!(node.pool, "pool-a");
    assert_eq!(node.zone, "asia-northeast1-a");
    assert_eq!(node.age, Duration::from_secs(600));
    assert!(node.ready);
}

#[test]
fn skips_nodes_without_pool_label() {
    let node = corev1::Node {
        metadata: metav1::ObjectMeta::new("control-plane"),
        ..default()
    };
    assert!(node.to_purge_node(UNIX_EPOCH).is_none());
}

#[test]
fn falls_back_to_legacy_zone_label() {
    let node = corev1::Node {
        metadata: metav1::ObjectMeta::new("n")
            .label(NODE_POOL_LABEL, "pool-a")
            .label(LEGACY_ZONE_LABEL, "us-central1-b"),
        ..default()
    };
    assert_eq!(node.zone(), Some("us-central1-b"));
}

#[test]
fn cordoned_node_is_not_ready() {
    let node = cordoned(gke_node("gke-a-1", "pool-a"));
    assert!(node.is_unschedulable());
    assert!(!node.is_ready());
}

#[test]
fn failing_ready_condition_is_not_ready() {
    let mut node = gke_node("gke-a-1", "pool-a");
    if let Some(status) = node.status.as_mut() {
        status.conditions = Some(vec![condition("Ready", "Unknown")]);
    }
    assert!(!node.is_ready());

    let bare = corev1::Node::default();
    assert!(!bare.is_ready());
}

#[test]
fn age_is_never_negative() {
    let node = gke_node("gke-a-1", "pool-a");
    assert_eq!(node.age_at(UNIX_EPOCH), Duration::ZERO);

    let unborn = corev1::Node::default();
    assert_eq!(unborn.age_at(UNIX_EPOCH + Duration::from_secs(5)), Duration::ZERO);
}

#[test]
fn pod_ref_defaults_namespace() {
    let pod = corev1::Pod {
        metadata: metav1::ObjectMeta::new("web-0"),
        ..default()
    };
    assert_eq!(pod.pod_ref(), Some(PodRef::new("default", "web-0")));

    let pod = corev1::Pod {
        metadata: metav1::ObjectMeta::with_namespace("web-0", "shop"),
        ..default()
    };
    assert_eq!(pod.pod_ref().map(|pod| pod.to_string()).as_deref(), Some("shop/web-0"));
}

#[test]
fn eviction_resource_name() {
    assert_eq!(POD_EVICTION_RESOURCE, "pods/eviction");
}
