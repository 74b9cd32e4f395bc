//! pulse-kube — Kubernetes control-plane node inspection.
//!
//! Lists the nodes visible to the API server, keeps the subset that
//! hosts control-plane components (selected by an injected predicate,
//! label-based by default), and extracts each kept node's internal IP
//! and readiness.

pub mod error;
pub mod inspector;

pub use error::{KubeError, KubeResult};
pub use inspector::{NodeInspector, has_control_plane_role, is_ready};
