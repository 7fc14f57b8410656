use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum Errors {
    #[error("Lookup Failed for {host} {source:?}")]
    Resolution {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("No IPv4 Address Found for {0}")]
    NoIpv4(String),
    #[error("Unsupported Address {0}")]
    UnsupportedAddress(String),
}

/// A connect destination usable on the wire: one IPv4 address and a port.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedTarget {
    pub addr: Ipv4Addr,
    pub port: u16,
}

/// Turn a hostname or IP literal into a [`ResolvedTarget`].
///
/// IPv4 literals are used as-is, with no lookup. Hostnames get a single DNS
/// lookup, and the first IPv4 candidate in returned order wins. IPv6 cannot
/// be carried by the protocol, so v6 literals are rejected and v6 candidates
/// are skipped.
pub async fn resolve(host: &str, port: u16) -> Result<ResolvedTarget, Errors> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return match ip {
            IpAddr::V4(addr) => Ok(ResolvedTarget { addr, port }),
            IpAddr::V6(_) => Err(Errors::UnsupportedAddress(host.to_string())),
        };
    }

    let candidates = tokio::net::lookup_host((host, port))
        .await
        .map_err(|source| Errors::Resolution {
            host: host.to_string(),
            source,
        })?;

    let addr = first_ipv4(candidates).ok_or_else(|| Errors::NoIpv4(host.to_string()))?;

    debug!(host, addr = %addr, "resolved");

    Ok(ResolvedTarget { addr, port })
}

fn first_ipv4(candidates: impl IntoIterator<Item = SocketAddr>) -> Option<Ipv4Addr> {
    candidates.into_iter().find_map(|addr| match addr.ip() {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(_) => None,
    })
}
