//! pulse-model — shared data model for the pulse diagnostic.
//!
//! One inspection pass produces immutable per-node records keyed by node
//! name: `EtcdNode` entries from the etcd member probe and `KubeNode`
//! entries from the Kubernetes API. The two maps are held together as a
//! `ClusterNodes` for the duration of a single reconciliation pass and
//! discarded at process exit — nothing here is persisted or mutated
//! after construction.

mod types;

pub use types::{ClusterHealth, ClusterNodes, EtcdNode, KubeNode};
