use std::error::Error as StdError;
use std::io;

use super::types::{Error, Kind};

impl Error {
    /// Returns true if the configuration input was rejected.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidArgument)
    }

    /// Returns true if the error is related to a timeout.
    ///
    /// Also true for transport errors whose underlying I/O error timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        if matches!(self.inner.kind, Kind::Timeout) {
            return true;
        }

        let mut source = self.source();
        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<io::Error>()
                && io.kind() == io::ErrorKind::TimedOut
            {
                return true;
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the error came from the socket layer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.inner.kind, Kind::Transport)
    }

    /// Returns true if the proxy closed the connection mid-response.
    #[must_use]
    pub fn is_connection_closed(&self) -> bool {
        matches!(self.inner.kind, Kind::ConnectionClosed)
    }

    /// Returns true if the proxy declined the tunnel.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self.inner.kind, Kind::ProxyRejected { .. })
    }

    /// Returns true if repeating the whole negotiation may succeed.
    ///
    /// Configuration and protocol errors are permanent; I/O, timeout, closure
    /// and allocation failures are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.inner.kind {
            Kind::Transport | Kind::Timeout | Kind::ConnectionClosed | Kind::OutOfMemory => true,
            Kind::InvalidArgument
            | Kind::RequestTooLarge
            | Kind::ResponseTooLarge
            | Kind::ProxyRejected { .. } => false,
        }
    }

    /// Returns the proxy's status code, if the proxy rejected the tunnel.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self.inner.kind {
            Kind::ProxyRejected { status, .. } => status,
            _ => None,
        }
    }

    /// Returns the proxy's status line, if the proxy rejected the tunnel.
    #[must_use]
    pub fn status_line(&self) -> Option<&str> {
        match &self.inner.kind {
            Kind::ProxyRejected { status_line, .. } => Some(status_line),
            _ => None,
        }
    }
}
