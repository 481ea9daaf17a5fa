//! Proxy connection management
//!
//! Establishes application-layer TCP tunnels through HTTP proxies using
//! the `CONNECT` method.

pub mod tcp;
pub mod tunnel;

pub use tcp::{
    ProxyTransport, Readiness, ResponseBuffer, configure_tcp_socket, connect_to_address_list,
    connect_via_proxy, establish_connect_tunnel, negotiate_tunnel, resolve_host_sync,
};
pub use tunnel::Tunnel;
