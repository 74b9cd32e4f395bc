//! pulse-etcd — etcd cluster inspection.
//!
//! Lists the members of an etcd cluster over an authenticated client,
//! probes each member's `/health` endpoint independently over its
//! advertised client URLs, and aggregates a whole-cluster verdict.
//!
//! Probing is deliberately forgiving: a member that cannot be reached is
//! recorded as unhealthy and the inspection carries on. Only the member
//! list call itself (and the credential/client setup before it) is fatal.

pub mod error;
pub mod inspector;
pub mod probe;
pub mod tls;

pub use error::{EtcdError, EtcdResult};
pub use inspector::EtcdInspector;
pub use probe::ProbeOutcome;
pub use tls::{TlsMaterial, TlsPaths};
