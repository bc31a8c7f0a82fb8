//! Server address resolution.

use std::io;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Resolve the configured `server-ip` setting.
///
/// An unset value resolves to the machine's primary local address. IP
/// literals are used as is; host names are looked up and the first IPv4
/// result is preferred.
pub async fn resolve_host(configured: Option<&str>) -> io::Result<IpAddr> {
    let Some(host) = configured.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(local_address());
    };
    if let Ok(ip) = host.parse() {
        return Ok(ip);
    }

    let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await?
        .map(|addr| addr.ip())
        .collect();
    tracing::debug!(host, ?addrs, "Resolved server-ip host name");

    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} did not resolve to any address", host),
            )
        })
}

/// Primary local IPv4 address of this machine, or loopback when there is
/// no route.
///
/// Connecting a UDP socket only selects a route; nothing is sent.
pub fn local_address() -> IpAddr {
    let routed = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|socket| {
            socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9))?;
            socket.local_addr()
        })
        .map(|addr| addr.ip());

    match routed {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(e) => {
            tracing::debug!(error = %e, "No route for local address discovery, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}
