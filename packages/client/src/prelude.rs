//! mqtunnel prelude
//!
//! The types needed to configure a proxy and open a tunnel.

pub use crate::config::TunnelConfig;
pub use crate::connect::{
    ProxyTransport, Readiness, Tunnel, connect_via_proxy, establish_connect_tunnel,
    negotiate_tunnel,
};
pub use crate::error::{Error, Kind, Result};
pub use crate::proxy::{ProxyConfig, basic_auth_value};
