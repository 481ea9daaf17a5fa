//! DNS resolution and address handling utilities
//!
//! Resolves the proxy host with an IP address fast path.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::str::FromStr;

use crate::error::{self, Result};

/// Resolve hostname to socket addresses synchronously.
///
/// # Errors
///
/// `InvalidArgument` for an empty host; `Transport` if resolution fails or
/// yields no addresses.
pub fn resolve_host_sync(host: &str, port: u16) -> Result<Vec<SocketAddr>> {
    if host.is_empty() {
        return Err(error::invalid_argument("cannot resolve an empty host"));
    }

    // Fast path for IP addresses
    if let Ok(ip) = IpAddr::from_str(host) {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| {
            tracing::debug!(host = %host, error = %e, "DNS resolution failed");
            error::transport(e)
        })?
        .collect();

    if addrs.is_empty() {
        return Err(error::transport(format!("No addresses resolved for {host}")));
    }
    Ok(addrs)
}
