//! Tunnel negotiation configuration
//!
//! Timeout budget, buffer capacities and socket tuning used when opening a
//! tunnel through an HTTP proxy.

use std::time::Duration;

use crate::error::{self, Result};

/// Reference capacity of the formatted CONNECT request.
///
/// A request of exactly this many bytes is sent; only longer ones are rejected.
pub const DEFAULT_REQUEST_CAPACITY: usize = 1024;

/// Reference capacity of the proxy response buffer, terminator slot included.
pub const DEFAULT_RESPONSE_CAPACITY: usize = 2048;

/// Reference ceiling on the total wait for the proxy response headers.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Smallest request that can carry `CONNECT h:1 HTTP/1.1\r\nHost: h:1\r\n\r\n`.
const MIN_REQUEST_CAPACITY: usize = 64;

/// Smallest response buffer that can hold `HTTP/1.1 200\r\n\r\n` plus the reserved byte.
const MIN_RESPONSE_CAPACITY: usize = 17;

/// Runtime tunnel configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelConfig {
    /// TCP connect timeout per proxy address
    pub connect_timeout: Duration,
    /// Ceiling on the total wait for writing the request and reading the response headers
    pub response_timeout: Duration,
    /// Largest CONNECT request that is sent, in bytes (inclusive, unlike a
    /// NUL-terminated buffer of the same size, which holds one byte less)
    pub request_capacity: usize,
    /// Capacity of the response buffer; one byte is reserved
    pub response_capacity: usize,
    /// Enable `TCP_NODELAY` on the proxy socket
    pub nodelay: bool,
    /// TCP keepalive idle time on the proxy socket
    pub keepalive: Option<Duration>,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            request_capacity: DEFAULT_REQUEST_CAPACITY,
            response_capacity: DEFAULT_RESPONSE_CAPACITY,
            nodelay: true,
            keepalive: None,
        }
    }
}

impl TunnelConfig {
    /// Create aggressive timeout configuration
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            response_timeout: Duration::from_secs(3),
            ..Self::default()
        }
    }

    /// Set the TCP connect timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the ceiling on the total wait for the proxy's response headers
    ///
    /// The budget starts before the request is written and is shared by every
    /// poll of one negotiation; it is not renewed after a partial read.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_request_capacity(mut self, capacity: usize) -> Self {
        self.request_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_response_capacity(mut self, capacity: usize) -> Self {
        self.response_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    #[must_use]
    pub fn with_keepalive(mut self, keepalive: Option<Duration>) -> Self {
        self.keepalive = keepalive;
        self
    }

    /// Validate tunnel configuration
    ///
    /// # Errors
    ///
    /// Returns an `InvalidArgument` error if:
    /// - `connect_timeout` or `response_timeout` is zero
    /// - either buffer capacity is too small to hold a minimal message
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(error::invalid_argument("connect_timeout cannot be zero"));
        }

        if self.response_timeout.is_zero() {
            return Err(error::invalid_argument("response_timeout cannot be zero"));
        }

        if self.request_capacity < MIN_REQUEST_CAPACITY {
            return Err(error::invalid_argument(format!(
                "request_capacity must be at least {MIN_REQUEST_CAPACITY} bytes"
            )));
        }

        if self.response_capacity < MIN_RESPONSE_CAPACITY {
            return Err(error::invalid_argument(format!(
                "response_capacity must be at least {MIN_RESPONSE_CAPACITY} bytes"
            )));
        }

        Ok(())
    }
}
