//! Control-plane node discovery.
//!
//! The list call talks to the API server; everything after it
//! (filtering, IP and readiness extraction) is a pure pass over the
//! listed items so it stays testable without a client.

use std::collections::HashMap;

use k8s_openapi::api::core::v1::{Node, NodeAddress};
use kube::{Api, api::ListParams};
use tracing::{debug, info};

use pulse_model::KubeNode;

use crate::error::{KubeError, KubeResult};

/// Address type Kubernetes uses for intra-cluster routing.
const INTERNAL_IP: &str = "InternalIP";

/// Role labels kubeadm (and most distributions) put on control-plane
/// nodes; the older `master` spelling is still seen on long-lived
/// clusters.
const CONTROL_PLANE_LABELS: [&str; 2] = [
    "node-role.kubernetes.io/control-plane",
    "node-role.kubernetes.io/master",
];

/// Predicate selecting the nodes that host control-plane components.
pub type NodePredicate = Box<dyn Fn(&Node) -> bool + Send + Sync>;

/// Label-based control-plane check.
pub fn has_control_plane_role(node: &Node) -> bool {
    node.metadata
        .labels
        .as_ref()
        .map(|labels| CONTROL_PLANE_LABELS.iter().any(|l| labels.contains_key(*l)))
        .unwrap_or(false)
}

/// A node is ready unless it carries an explicit `Ready` condition with
/// a status other than `"True"`. A missing condition counts as ready;
/// only an explicit non-true status flips the node to not-ready.
pub fn is_ready(node: &Node) -> bool {
    let Some(conditions) = node.status.as_ref().and_then(|s| s.conditions.as_ref()) else {
        return true;
    };
    for cond in conditions {
        if cond.type_ == "Ready" && cond.status != "True" {
            return false;
        }
    }
    true
}

/// First internal IP in the node's advertised address list.
fn internal_ip(name: &str, node: &Node) -> KubeResult<String> {
    let addresses: &[NodeAddress] = node
        .status
        .as_ref()
        .and_then(|s| s.addresses.as_deref())
        .unwrap_or_default();

    let mut by_type: HashMap<&str, Vec<&NodeAddress>> = HashMap::new();
    for addr in addresses {
        by_type.entry(addr.type_.as_str()).or_default().push(addr);
    }

    match by_type.get(INTERNAL_IP).and_then(|list| list.first()) {
        Some(addr) => Ok(addr.address.clone()),
        None => Err(KubeError::HostIpUnknown {
            node: name.to_string(),
            addresses: addresses
                .iter()
                .map(|a| format!("{}={}", a.type_, a.address))
                .collect(),
        }),
    }
}

/// Inspects the cluster's control-plane node inventory through an
/// authenticated Kubernetes client.
pub struct NodeInspector {
    client: kube::Client,
    predicate: NodePredicate,
}

impl NodeInspector {
    /// Inspector with the default label-based control-plane predicate.
    pub fn new(client: kube::Client) -> Self {
        Self {
            client,
            predicate: Box::new(has_control_plane_role),
        }
    }

    /// Inspector selecting nodes whose name contains `fragment` — the
    /// historical convention for clusters without role labels.
    pub fn with_name_filter(client: kube::Client, fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        Self::with_predicate(client, move |node: &Node| {
            node.metadata
                .name
                .as_deref()
                .is_some_and(|n| n.contains(&fragment))
        })
    }

    /// Inspector with a caller-supplied predicate.
    pub fn with_predicate(
        client: kube::Client,
        predicate: impl Fn(&Node) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            client,
            predicate: Box::new(predicate),
        }
    }

    /// List all nodes and keep the control-plane subset with readiness
    /// and internal IP extracted. Fails on the list call or on a kept
    /// node with no internal IP.
    pub async fn inspect(&self) -> KubeResult<HashMap<String, KubeNode>> {
        let api: Api<Node> = Api::all(self.client.clone());
        let nodes = api
            .list(&ListParams::default())
            .await
            .map_err(KubeError::NodeList)?;

        let collected = collect_nodes(nodes.items, &self.predicate)?;
        info!(count = collected.len(), "control-plane nodes inspected");
        Ok(collected)
    }
}

/// Pure filtering/extraction pass over a listed node set.
fn collect_nodes(
    items: Vec<Node>,
    predicate: &NodePredicate,
) -> KubeResult<HashMap<String, KubeNode>> {
    let mut out = HashMap::new();
    for node in items {
        if !predicate(&node) {
            continue;
        }
        let Some(name) = node.metadata.name.clone() else {
            debug!("skipping unnamed node");
            continue;
        };
        let ip = internal_ip(&name, &node)?;
        let ready = is_ready(&node);
        debug!(node = %name, %ip, ready, "control-plane node");
        out.insert(name.clone(), KubeNode { name, ip, ready });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use k8s_openapi::api::core::v1::{NodeCondition, NodeStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn address(type_: &str, address: &str) -> NodeAddress {
        NodeAddress {
            type_: type_.to_string(),
            address: address.to_string(),
        }
    }

    fn condition(type_: &str, status: &str) -> NodeCondition {
        NodeCondition {
            type_: type_.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    fn node(name: &str, labels: &[&str], addresses: Vec<NodeAddress>) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(
                    labels
                        .iter()
                        .map(|l| (l.to_string(), String::new()))
                        .collect::<BTreeMap<_, _>>(),
                ),
                ..Default::default()
            },
            status: Some(NodeStatus {
                addresses: Some(addresses),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn control_plane_node(name: &str, ip: &str) -> Node {
        node(
            name,
            &["node-role.kubernetes.io/control-plane"],
            vec![address("InternalIP", ip)],
        )
    }

    #[test]
    fn label_predicate_selects_control_plane() {
        assert!(has_control_plane_role(&control_plane_node(
            "cp-0", "10.0.0.1"
        )));
        assert!(has_control_plane_role(&node(
            "cp-1",
            &["node-role.kubernetes.io/master"],
            vec![],
        )));
        assert!(!has_control_plane_role(&node("worker-0", &[], vec![])));
    }

    #[test]
    fn missing_ready_condition_counts_as_ready() {
        assert!(is_ready(&control_plane_node("cp-0", "10.0.0.1")));
    }

    #[test]
    fn explicit_non_true_ready_condition_flips() {
        let mut n = control_plane_node("cp-0", "10.0.0.1");
        n.status.as_mut().unwrap().conditions = Some(vec![condition("Ready", "False")]);
        assert!(!is_ready(&n));

        n.status.as_mut().unwrap().conditions = Some(vec![condition("Ready", "Unknown")]);
        assert!(!is_ready(&n));

        n.status.as_mut().unwrap().conditions = Some(vec![condition("Ready", "True")]);
        assert!(is_ready(&n));
    }

    #[test]
    fn unrelated_conditions_are_ignored() {
        let mut n = control_plane_node("cp-0", "10.0.0.1");
        n.status.as_mut().unwrap().conditions = Some(vec![condition("MemoryPressure", "False")]);
        assert!(is_ready(&n));
    }

    #[test]
    fn internal_ip_prefers_first_of_type() {
        let n = node(
            "cp-0",
            &["node-role.kubernetes.io/control-plane"],
            vec![
                address("ExternalIP", "203.0.113.7"),
                address("InternalIP", "10.0.0.1"),
                address("InternalIP", "10.0.0.99"),
            ],
        );
        assert_eq!(internal_ip("cp-0", &n).unwrap(), "10.0.0.1");
    }

    #[test]
    fn missing_internal_ip_names_node_and_addresses() {
        let n = node(
            "cp-0",
            &["node-role.kubernetes.io/control-plane"],
            vec![address("ExternalIP", "203.0.113.7")],
        );
        let err = internal_ip("cp-0", &n).unwrap_err();
        match &err {
            KubeError::HostIpUnknown { node, addresses } => {
                assert_eq!(node, "cp-0");
                assert_eq!(addresses, &["ExternalIP=203.0.113.7".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("cp-0"));
        assert!(err.to_string().contains("ExternalIP"));
    }

    #[test]
    fn collect_keeps_only_control_plane_nodes() {
        let items = vec![
            control_plane_node("cp-0", "10.0.0.1"),
            node("worker-0", &[], vec![address("InternalIP", "10.0.1.1")]),
        ];
        let predicate: NodePredicate = Box::new(has_control_plane_role);
        let out = collect_nodes(items, &predicate).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out["cp-0"].ip, "10.0.0.1");
        assert!(out["cp-0"].ready);
    }

    #[test]
    fn collect_fails_on_control_plane_node_without_internal_ip() {
        let items = vec![node(
            "cp-0",
            &["node-role.kubernetes.io/control-plane"],
            vec![address("ExternalIP", "203.0.113.7")],
        )];
        let predicate: NodePredicate = Box::new(has_control_plane_role);
        assert!(matches!(
            collect_nodes(items, &predicate),
            Err(KubeError::HostIpUnknown { .. })
        ));
    }

    #[test]
    fn name_fragment_predicate() {
        let items = vec![
            node("k8s-master-0", &[], vec![address("InternalIP", "10.0.0.1")]),
            node("k8s-agent-0", &[], vec![address("InternalIP", "10.0.1.1")]),
        ];
        let predicate: NodePredicate = Box::new(|n: &Node| {
            n.metadata
                .name
                .as_deref()
                .is_some_and(|name| name.contains("master"))
        });
        let out = collect_nodes(items, &predicate).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("k8s-master-0"));
    }
}
