//! The `check-etcd` command.
//!
//! Builds the two authenticated clients, runs the etcd and Kubernetes
//! inspections concurrently, and reconciles the two node sets. Either
//! inspection failing aborts the run; there is no partial
//! reconciliation against an incomplete node set.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use pulse_etcd::{EtcdInspector, TlsMaterial, TlsPaths};
use pulse_kube::NodeInspector;
use pulse_model::ClusterNodes;
use pulse_reconcile::{ReconcileOptions, reconcile};

/// Arguments for `pulse check-etcd`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// CA certificate for the etcd client connection.
    #[arg(long, default_value = "/etc/kubernetes/pki/etcd/ca.crt")]
    pub ca_cert: PathBuf,

    /// Client certificate presented to etcd.
    #[arg(long, default_value = "/etc/kubernetes/pki/etcd/server.crt")]
    pub cert: PathBuf,

    /// Private key for the client certificate.
    #[arg(long, default_value = "/etc/kubernetes/pki/etcd/server.key")]
    pub key: PathBuf,

    /// etcd client endpoint to connect to.
    #[arg(long, default_value = "https://127.0.0.1:2379")]
    pub endpoint: String,

    /// Select control-plane nodes by name substring instead of the
    /// default role labels.
    #[arg(long)]
    pub name_filter: Option<String>,

    /// Only verify membership and IPs; accept unhealthy members and
    /// not-ready nodes.
    #[arg(long)]
    pub allow_unhealthy: bool,
}

pub async fn run(args: CheckArgs) -> anyhow::Result<()> {
    info!("getting etcd cluster info");

    let paths = TlsPaths {
        ca_cert: args.ca_cert,
        cert: args.cert,
        key: args.key,
    };
    let material = TlsMaterial::load(&paths)?;
    let mut etcd = EtcdInspector::connect(&args.endpoint, &material).await?;

    // Ambient credential discovery: kubeconfig or in-cluster.
    let kube_client = kube::Client::try_default()
        .await
        .context("failed to build kubernetes client")?;
    let kube = match args.name_filter {
        Some(fragment) => NodeInspector::with_name_filter(kube_client, fragment),
        None => NodeInspector::new(kube_client),
    };

    // The two inspections are independent; run them concurrently and
    // fail the whole run if either side fails.
    let (etcd_result, kube_nodes) = tokio::try_join!(
        async { etcd.inspect().await.map_err(anyhow::Error::from) },
        async { kube.inspect().await.map_err(anyhow::Error::from) },
    )?;
    let (etcd_nodes, verdict) = etcd_result;
    info!(%verdict, "etcd cluster verdict");

    let nodes = ClusterNodes {
        etcd_nodes,
        kube_nodes,
    };
    info!(nodes = %serde_json::to_string(&nodes)?, "discovered node sets");

    let options = ReconcileOptions {
        require_health: !args.allow_unhealthy,
    };
    reconcile(&nodes, &options)?;

    info!("etcd and kube master node IPs matched");
    Ok(())
}
