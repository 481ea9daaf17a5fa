//! TCP socket configuration utilities
//!
//! Applies nodelay and keepalive to the proxy socket before negotiation.

use std::net::TcpStream;
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};

use crate::error::{self, Result};

/// Configure TCP socket options on the proxy connection.
///
/// # Errors
///
/// `Transport` if the operating system rejects an option.
pub fn configure_tcp_socket(
    stream: &TcpStream,
    nodelay: bool,
    keepalive: Option<Duration>,
) -> Result<()> {
    if nodelay {
        stream.set_nodelay(true).map_err(error::transport)?;
    }

    if let Some(idle) = keepalive {
        let params = TcpKeepalive::new().with_time(idle);
        SockRef::from(stream)
            .set_tcp_keepalive(&params)
            .map_err(error::transport)?;
        tracing::debug!(idle_secs = idle.as_secs(), "TCP keepalive enabled on proxy socket");
    }

    Ok(())
}
