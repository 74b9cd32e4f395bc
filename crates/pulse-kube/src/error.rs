//! Error types for Kubernetes node inspection.

use thiserror::Error;

/// Result type alias for node inspection operations.
pub type KubeResult<T> = Result<T, KubeError>;

/// Fatal errors during node inspection. Both abort the run before any
/// reconciliation happens.
#[derive(Debug, Error)]
pub enum KubeError {
    #[error("failed to list nodes: {0}")]
    NodeList(#[source] kube::Error),

    /// A control-plane node advertised no internal IP. `addresses`
    /// carries the `type=address` pairs the node did report.
    #[error("host IP unknown for node {node}; known addresses: {addresses:?}")]
    HostIpUnknown {
        node: String,
        addresses: Vec<String>,
    },
}
