//! Etcd cluster inspection.
//!
//! Lists cluster members and probes each one concurrently. Probes are
//! independent of each other: a member that cannot be reached is
//! recorded as unhealthy without aborting the rest of the pass.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::{info, warn};

use pulse_model::{ClusterHealth, EtcdNode};

use crate::error::{EtcdError, EtcdResult};
use crate::probe::{ProbeOutcome, probe_member};
use crate::tls::TlsMaterial;

/// Inspects one etcd cluster through an authenticated cluster client
/// plus a mutual-TLS HTTP client for per-member health probes, both
/// built from the same credential triplet.
pub struct EtcdInspector {
    client: etcd_client::Client,
    http: reqwest::Client,
}

impl EtcdInspector {
    /// Connect to the configured cluster endpoint.
    pub async fn connect(endpoint: &str, material: &TlsMaterial) -> EtcdResult<Self> {
        let options = etcd_client::ConnectOptions::new().with_tls(material.etcd_tls_options());
        let client = etcd_client::Client::connect([endpoint], Some(options))
            .await
            .map_err(|source| EtcdError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            http: material.http_client()?,
        })
    }

    /// Wrap pre-built clients.
    pub fn from_parts(client: etcd_client::Client, http: reqwest::Client) -> Self {
        Self { client, http }
    }

    /// List members, probe each one, and derive the cluster verdict.
    ///
    /// Only the member list call is fatal; every probe failure is
    /// absorbed into the per-member records and the aggregate counts.
    pub async fn inspect(&mut self) -> EtcdResult<(HashMap<String, EtcdNode>, ClusterHealth)> {
        let resp = self.client.member_list().await.map_err(|source| {
            warn!("cluster may be unhealthy: failed to list members");
            EtcdError::MemberList(source)
        })?;

        let probes = resp.members().iter().map(|member| {
            let http = self.http.clone();
            let name = member.name().to_string();
            let urls = member.client_urls().to_vec();
            async move {
                let outcome = probe_member(&http, &name, &urls).await;
                (name, outcome)
            }
        });
        let outcomes = join_all(probes).await;

        let (nodes, verdict) = collect_members(outcomes);
        info!("cluster is {verdict}");
        Ok((nodes, verdict))
    }
}

/// Fold probe outcomes into per-name node records and the count-based
/// verdict.
fn collect_members(
    outcomes: Vec<(String, ProbeOutcome)>,
) -> (HashMap<String, EtcdNode>, ClusterHealth) {
    let total = outcomes.len();
    let mut nodes = HashMap::with_capacity(total);
    let mut healthy = 0;

    for (name, outcome) in outcomes {
        let node = match outcome {
            ProbeOutcome::Healthy { ip } => {
                healthy += 1;
                EtcdNode {
                    name: name.clone(),
                    ip,
                    healthy: true,
                }
            }
            ProbeOutcome::Unhealthy | ProbeOutcome::Unreachable => EtcdNode {
                name: name.clone(),
                ip: String::new(),
                healthy: false,
            },
        };
        nodes.insert(name, node);
    }

    (nodes, ClusterHealth::from_counts(healthy, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, outcome: ProbeOutcome) -> (String, ProbeOutcome) {
        (name.to_string(), outcome)
    }

    #[test]
    fn all_members_healthy() {
        let (nodes, verdict) = collect_members(vec![
            outcome(
                "a",
                ProbeOutcome::Healthy {
                    ip: "10.0.0.1".to_string(),
                },
            ),
            outcome(
                "b",
                ProbeOutcome::Healthy {
                    ip: "10.0.0.2".to_string(),
                },
            ),
        ]);
        assert_eq!(verdict, ClusterHealth::Healthy);
        assert_eq!(nodes["a"].ip, "10.0.0.1");
        assert!(nodes["b"].healthy);
    }

    #[test]
    fn unreachable_member_degrades_cluster() {
        let (nodes, verdict) = collect_members(vec![
            outcome(
                "a",
                ProbeOutcome::Healthy {
                    ip: "10.0.0.1".to_string(),
                },
            ),
            outcome("b", ProbeOutcome::Unreachable),
        ]);
        assert_eq!(verdict, ClusterHealth::Degraded);
        assert!(!nodes["b"].healthy);
        assert_eq!(nodes["b"].ip, "");
    }

    #[test]
    fn no_healthy_members_is_unavailable() {
        let (_, verdict) = collect_members(vec![
            outcome("a", ProbeOutcome::Unhealthy),
            outcome("b", ProbeOutcome::Unreachable),
        ]);
        assert_eq!(verdict, ClusterHealth::Unavailable);
    }

    #[test]
    fn unhealthy_member_keeps_no_ip() {
        let (nodes, _) = collect_members(vec![outcome("a", ProbeOutcome::Unhealthy)]);
        assert_eq!(nodes["a"].ip, "");
        assert!(!nodes["a"].healthy);
    }
}
