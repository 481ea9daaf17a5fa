//! Proxy connection establishment
//!
//! Opens the TCP connection to the configured proxy and negotiates the
//! CONNECT tunnel on it.

use std::net::TcpStream;
use std::time::Instant;

use super::basic_connection::connect_to_address_list;
use super::dns_resolution::resolve_host_sync;
use super::http_connect::negotiate_tunnel;
use super::socket_config::configure_tcp_socket;
use crate::config::TunnelConfig;
use crate::connect::tunnel::Tunnel;
use crate::error::{self, Result};
use crate::proxy::ProxyConfig;

/// Connect to the proxy and open a tunnel to `dest_host:dest_port`.
///
/// # Errors
///
/// `InvalidArgument` for an unset proxy or invalid `config`, `Transport` if
/// the proxy cannot be resolved or reached, and every error of
/// [`negotiate_tunnel`].
pub fn connect_via_proxy(
    proxy: &ProxyConfig,
    config: &TunnelConfig,
    dest_host: &str,
    dest_port: u16,
) -> Result<Tunnel<TcpStream>> {
    config.validate()?;
    let proxy_host = proxy
        .host()
        .ok_or_else(|| error::invalid_argument("proxy is not configured"))?;

    let start_time = Instant::now();
    let addrs = resolve_host_sync(proxy_host, proxy.port())?;
    let stream = connect_to_address_list(&addrs, Some(config.connect_timeout)).inspect_err(|e| {
        tracing::warn!(
            proxy.host = %proxy_host,
            proxy.port = proxy.port(),
            error = %e,
            elapsed_ms = start_time.elapsed().as_millis(),
            "Failed to connect to proxy server"
        );
    })?;

    tracing::debug!(
        elapsed_ms = start_time.elapsed().as_millis(),
        "TCP connection to proxy established"
    );

    configure_tcp_socket(&stream, config.nodelay, config.keepalive)?;

    let tunnel = negotiate_tunnel(stream, dest_host, dest_port, proxy, config)?;

    tracing::debug!(
        elapsed_ms = start_time.elapsed().as_millis(),
        "Proxy tunnel ready"
    );

    Ok(tunnel)
}
