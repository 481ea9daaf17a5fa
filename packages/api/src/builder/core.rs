//! Core `ProxyTunnelBuilder` structure and base functionality
//!
//! Holds the proxy description and negotiation tuning collected through the
//! fluent interface. Configuration errors are recorded as they happen and
//! reported when the tunnel is opened, so chains never break midway.

use std::time::Duration;

use mqtunnel_client::{Error, ProxyConfig, TunnelConfig};

/// Fluent builder for a proxy tunnel
#[derive(Debug)]
pub struct ProxyTunnelBuilder {
    /// Proxy the tunnel goes through
    pub(crate) proxy: ProxyConfig,
    /// Negotiation budgets and socket tuning
    pub(crate) tunnel: TunnelConfig,
    /// First configuration error, surfaced by the terminal methods
    pub(crate) pending: Option<Error>,
    /// Debug logging enabled flag
    pub(crate) debug_enabled: bool,
}

impl ProxyTunnelBuilder {
    /// Start from an existing proxy configuration with default tuning
    #[must_use]
    pub fn new(proxy: ProxyConfig) -> Self {
        Self {
            proxy,
            tunnel: TunnelConfig::default(),
            pending: None,
            debug_enabled: false,
        }
    }

    /// Start a builder for the proxy at `host:port`
    ///
    /// An empty host or port 0 is reported by [`connect`](Self::connect).
    #[must_use]
    pub fn via(host: &str, port: u16) -> Self {
        match ProxyConfig::with(host, port, None) {
            Ok(proxy) => Self::new(proxy),
            Err(e) => Self::new(ProxyConfig::new()).fail(e),
        }
    }

    /// Start a builder from an `http://[user[:password]@]host[:port]` proxy URL
    ///
    /// Credentials in the URL become a Basic `Proxy-Authorization` value.
    /// Parse errors are reported by [`connect`](Self::connect).
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        match ProxyConfig::from_url(url) {
            Ok(proxy) => Self::new(proxy),
            Err(e) => Self::new(ProxyConfig::new()).fail(e),
        }
    }

    /// Enable debug logging of the negotiation plan
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Set the ceiling on the total wait for the proxy's response headers
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.tunnel = self.tunnel.with_response_timeout(timeout);
        self
    }

    /// Set the TCP connect timeout per proxy address
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.tunnel = self.tunnel.with_connect_timeout(timeout);
        self
    }

    /// Enable TCP keepalive on the proxy socket with the given idle time
    #[must_use]
    pub fn keepalive(mut self, idle: Duration) -> Self {
        self.tunnel = self.tunnel.with_keepalive(Some(idle));
        self
    }

    #[must_use]
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.tunnel = self.tunnel.with_nodelay(nodelay);
        self
    }

    /// Replace all negotiation tuning at once
    #[must_use]
    pub fn config(mut self, tunnel: TunnelConfig) -> Self {
        self.tunnel = tunnel;
        self
    }

    #[must_use]
    pub fn proxy(&self) -> &ProxyConfig {
        &self.proxy
    }

    #[must_use]
    pub fn tunnel_config(&self) -> &TunnelConfig {
        &self.tunnel
    }

    /// Record `error` unless an earlier one is already pending
    pub(crate) fn fail(mut self, error: Error) -> Self {
        if self.pending.is_none() {
            tracing::debug!(error = %error, "Proxy tunnel builder misconfigured");
            self.pending = Some(error);
        }
        self
    }
}
