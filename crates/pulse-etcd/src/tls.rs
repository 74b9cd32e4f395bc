//! TLS credential loading.
//!
//! The health prober and the etcd cluster client authenticate with the
//! same CA/cert/key triplet, loaded once from configurable filesystem
//! paths (kubeadm's etcd PKI layout by default) and turned into the two
//! client configurations from here. No other module touches the
//! filesystem.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{EtcdError, EtcdResult};

/// Dial/handshake budget for each health probe.
pub const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Filesystem locations of the etcd client credential triplet.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub ca_cert: PathBuf,
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsPaths {
    /// The PKI layout kubeadm provisions on control-plane hosts.
    pub fn kubeadm_defaults() -> Self {
        Self {
            ca_cert: PathBuf::from("/etc/kubernetes/pki/etcd/ca.crt"),
            cert: PathBuf::from("/etc/kubernetes/pki/etcd/server.crt"),
            key: PathBuf::from("/etc/kubernetes/pki/etcd/server.key"),
        }
    }
}

/// PEM material loaded from a [`TlsPaths`] triplet.
#[derive(Debug)]
pub struct TlsMaterial {
    ca_pem: Vec<u8>,
    cert_pem: Vec<u8>,
    key_pem: Vec<u8>,
}

impl TlsMaterial {
    /// Read all three PEM files; the error names the offending path.
    pub fn load(paths: &TlsPaths) -> EtcdResult<Self> {
        Ok(Self {
            ca_pem: read_pem(&paths.ca_cert)?,
            cert_pem: read_pem(&paths.cert)?,
            key_pem: read_pem(&paths.key)?,
        })
    }

    /// Mutual-TLS HTTP client for health probes, with the fixed connect
    /// timeout applied.
    pub fn http_client(&self) -> EtcdResult<reqwest::Client> {
        let ca = reqwest::Certificate::from_pem(&self.ca_pem).map_err(EtcdError::Tls)?;
        let identity_pem = [self.cert_pem.as_slice(), b"\n", self.key_pem.as_slice()].concat();
        let identity = reqwest::Identity::from_pem(&identity_pem).map_err(EtcdError::Tls)?;

        reqwest::Client::builder()
            .use_rustls_tls()
            .add_root_certificate(ca)
            .identity(identity)
            .connect_timeout(PROBE_CONNECT_TIMEOUT)
            .build()
            .map_err(EtcdError::Tls)
    }

    /// Mutual-TLS options for the etcd cluster client.
    pub fn etcd_tls_options(&self) -> etcd_client::TlsOptions {
        etcd_client::TlsOptions::new()
            .ca_certificate(etcd_client::Certificate::from_pem(self.ca_pem.clone()))
            .identity(etcd_client::Identity::from_pem(
                self.cert_pem.clone(),
                self.key_pem.clone(),
            ))
    }
}

fn read_pem(path: &Path) -> EtcdResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| EtcdError::Credential {
        path: path.to_path_buf(),
        source,
    })
}
