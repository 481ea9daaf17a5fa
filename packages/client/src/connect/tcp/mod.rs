//! TCP connection utilities
//!
//! Proxy socket primitives, DNS resolution, socket configuration and HTTP
//! CONNECT negotiation.

pub mod basic_connection;
pub mod dns_resolution;
pub mod http_connect;
pub mod proxy_connection;
pub mod response_buffer;
pub mod socket_config;
pub mod transport;

pub use basic_connection::connect_to_address_list;
pub use dns_resolution::resolve_host_sync;
pub use http_connect::{establish_connect_tunnel, negotiate_tunnel};
pub use proxy_connection::connect_via_proxy;
pub use response_buffer::ResponseBuffer;
pub use socket_config::configure_tcp_socket;
pub use transport::{ProxyTransport, Readiness};
