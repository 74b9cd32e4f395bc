//! Error types for etcd inspection.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for etcd inspection operations.
pub type EtcdResult<T> = Result<T, EtcdError>;

/// Fatal errors during etcd inspection.
///
/// Per-endpoint probe failures are not errors; they are absorbed into
/// [`crate::probe::ProbeOutcome`] and only affect the aggregate verdict.
#[derive(Debug, Error)]
pub enum EtcdError {
    #[error("failed to read credential {}: {source}", path.display())]
    Credential {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build TLS client: {0}")]
    Tls(#[source] reqwest::Error),

    #[error("failed to connect to etcd at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: etcd_client::Error,
    },

    #[error("failed to list cluster members: {0}")]
    MemberList(#[source] etcd_client::Error),
}
