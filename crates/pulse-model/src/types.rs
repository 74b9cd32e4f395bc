//! Node records and the cluster health verdict.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// A single etcd cluster member as seen by one inspection pass.
///
/// `ip` is extracted from the client URL that answered the health probe;
/// members that never answered carry an empty `ip` and `healthy: false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtcdNode {
    pub name: String,
    pub ip: String,
    pub healthy: bool,
}

/// A Kubernetes control-plane node as seen by one inspection pass.
///
/// `name` must match the corresponding `EtcdNode`'s name for the two
/// records to be considered the same machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KubeNode {
    pub name: String,
    pub ip: String,
    pub ready: bool,
}

/// The two independently discovered views of the control-plane fleet,
/// keyed by node name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterNodes {
    pub etcd_nodes: HashMap<String, EtcdNode>,
    pub kube_nodes: HashMap<String, KubeNode>,
}

/// Whole-cluster health verdict, derived purely from how many members
/// probed healthy out of how many were listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClusterHealth {
    /// Every listed member probed healthy.
    Healthy,
    /// Some but not all members probed healthy.
    Degraded,
    /// No member probed healthy.
    Unavailable,
}

impl ClusterHealth {
    /// Derive the verdict from member counts.
    ///
    /// The all-healthy case is checked first, so an empty member list
    /// reports `Healthy` rather than `Unavailable`.
    pub fn from_counts(healthy: usize, total: usize) -> Self {
        match healthy {
            h if h == total => ClusterHealth::Healthy,
            0 => ClusterHealth::Unavailable,
            _ => ClusterHealth::Degraded,
        }
    }
}

impl fmt::Display for ClusterHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClusterHealth::Healthy => "healthy",
            ClusterHealth::Degraded => "degraded",
            ClusterHealth::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}
