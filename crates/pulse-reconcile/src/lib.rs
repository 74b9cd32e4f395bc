//! pulse-reconcile — cross-checks the two fleet views.
//!
//! Takes the etcd member map and the Kubernetes control-plane node map
//! and verifies they describe the same machines: equal size, equal IP
//! per shared name, and (by default) every member healthy and every
//! node ready. The first violation found is the reported cause; map
//! iteration order is unspecified, so when several violations exist any
//! one of them may be the reported one.

use thiserror::Error;
use tracing::info;

use pulse_model::ClusterNodes;

/// Strictness knobs for one reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Require every etcd member healthy and every kube node ready on
    /// top of the membership/IP checks.
    pub require_health: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            require_health: true,
        }
    }
}

/// A detected inconsistency between the two fleet views. Each variant
/// names the offending node (or counts) and is the final user-visible
/// failure cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("etcd and kubernetes node counts do not match: {etcd} etcd, {kube} kubernetes")]
    CountMismatch { etcd: usize, kube: usize },

    #[error("IP mismatch for node {node}")]
    IpMismatch { node: String },

    #[error("etcd member {node} is not healthy")]
    NodeUnhealthy { node: String },

    #[error("kubernetes node {node} is not ready")]
    NodeNotReady { node: String },
}

/// Verify that the etcd member set and the Kubernetes control-plane
/// node set agree on membership and identity.
///
/// The count check runs first and short-circuits; once counts are equal
/// a single pass over the etcd names covers both directions of the IP
/// check. The IP pass completes before any health check runs, so an IP
/// mismatch is always preferred as the cause when both kinds exist.
pub fn reconcile(nodes: &ClusterNodes, options: &ReconcileOptions) -> Result<(), ReconcileError> {
    let etcd = &nodes.etcd_nodes;
    let kube = &nodes.kube_nodes;

    if etcd.len() != kube.len() {
        return Err(ReconcileError::CountMismatch {
            etcd: etcd.len(),
            kube: kube.len(),
        });
    }

    for (name, etcd_node) in etcd {
        match kube.get(name) {
            Some(kube_node) if kube_node.ip == etcd_node.ip => {}
            _ => {
                return Err(ReconcileError::IpMismatch { node: name.clone() });
            }
        }
    }

    if options.require_health {
        if let Some(node) = etcd.values().find(|n| !n.healthy) {
            return Err(ReconcileError::NodeUnhealthy {
                node: node.name.clone(),
            });
        }
        if let Some(node) = kube.values().find(|n| !n.ready) {
            return Err(ReconcileError::NodeNotReady {
                node: node.name.clone(),
            });
        }
    }

    info!("etcd and kubernetes control-plane nodes match");
    Ok(())
}
