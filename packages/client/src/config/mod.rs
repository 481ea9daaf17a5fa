//! Tunnel configuration
//!
//! Budgets and capacities for CONNECT negotiation. Proxy endpoint settings
//! live in [`crate::proxy::ProxyConfig`].

pub mod tunnel;

pub use tunnel::{
    DEFAULT_REQUEST_CAPACITY, DEFAULT_RESPONSE_CAPACITY, DEFAULT_RESPONSE_TIMEOUT, TunnelConfig,
};
