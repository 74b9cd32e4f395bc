//! Member health probe.
//!
//! Probes a single etcd member over its advertised client URLs and
//! classifies it as healthy, unhealthy, or unreachable. URLs are tried
//! in listed order and the first one that answers end-to-end (connect,
//! body read, decode) decides the outcome — response content, not URL
//! order, decides healthy vs. unhealthy.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

/// Path every etcd member serves for liveness checks.
const HEALTH_PATH: &str = "/health";

static IPV4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,3}\.){3}[0-9]{1,3}").expect("valid ipv4 pattern"));

/// Outcome of probing one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A client URL answered with a positive health flag. `ip` is the
    /// first IPv4 dotted-quad substring of the URL that answered (empty
    /// for hostname-only URLs).
    Healthy { ip: String },
    /// A client URL answered with a negative health flag.
    Unhealthy,
    /// No client URL produced a decodable health response.
    Unreachable,
}

// etcd has served both shapes of the health flag over its lifetime.
#[derive(Deserialize)]
struct HealthText {
    health: String,
}

#[derive(Deserialize)]
struct HealthFlag {
    health: bool,
}

/// Decode a health response body, accepting the string shape
/// (`{"health":"true"}`) first and the boolean shape (`{"health":true}`)
/// on string-decode failure. Callers only ever see a boolean.
fn decode_health(body: &[u8]) -> Option<bool> {
    if let Ok(text) = serde_json::from_slice::<HealthText>(body) {
        return Some(text.health == "true");
    }
    serde_json::from_slice::<HealthFlag>(body)
        .ok()
        .map(|flag| flag.health)
}

/// First IPv4 dotted-quad substring of a URL, if any.
pub fn extract_ipv4(url: &str) -> Option<String> {
    IPV4_RE.find(url).map(|m| m.as_str().to_string())
}

/// Probe one member over its advertised client URLs.
///
/// A member with zero published URLs is `Unreachable` without any
/// network call. A URL that fails at any stage logs a warning and falls
/// through to the next; once every URL has failed the member is
/// `Unreachable`. No retries beyond that fallback.
pub async fn probe_member(
    http: &reqwest::Client,
    member: &str,
    client_urls: &[String],
) -> ProbeOutcome {
    if client_urls.is_empty() {
        warn!(%member, "member is unreachable: no published client urls");
        return ProbeOutcome::Unreachable;
    }

    for url in client_urls {
        let resp = match http.get(format!("{url}{HEALTH_PATH}")).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(%member, %url, error = %e, "health request failed");
                continue;
            }
        };
        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%member, %url, error = %e, "failed to read health response");
                continue;
            }
        };
        let Some(healthy) = decode_health(&body) else {
            warn!(%member, %url, "health response did not decode");
            continue;
        };

        if healthy {
            info!(%member, %url, "member is healthy");
            return ProbeOutcome::Healthy {
                ip: extract_ipv4(url).unwrap_or_default(),
            };
        }
        info!(%member, %url, "member is unhealthy");
        return ProbeOutcome::Unhealthy;
    }

    warn!(%member, urls = ?client_urls, "member is unreachable: all client urls failed");
    ProbeOutcome::Unreachable
}
