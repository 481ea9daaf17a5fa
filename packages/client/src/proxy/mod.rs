//! HTTP proxy configuration
//!
//! Proxy endpoint, preformatted authorization line, and Basic credential
//! encoding for CONNECT tunnels.

pub mod auth;
pub mod config;

pub use auth::basic_auth_value;
pub use config::ProxyConfig;
