//! Basic TCP connection establishment
//!
//! Connects to the first reachable address of the proxy with a per-address timeout.

use std::io;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::{self, Result};

/// Connect to first available address with timeout support.
///
/// # Errors
///
/// `InvalidArgument` for an empty list; otherwise a `Transport` error
/// wrapping the last connection failure.
pub fn connect_to_address_list(addrs: &[SocketAddr], timeout: Option<Duration>) -> Result<TcpStream> {
    if addrs.is_empty() {
        return Err(error::invalid_argument("No addresses to connect to"));
    }

    let mut last_error: Option<io::Error> = None;
    for addr in addrs {
        let attempt = match timeout {
            Some(t) => TcpStream::connect_timeout(addr, t),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Failed to connect to {}: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) => error::transport(e),
        None => error::transport("Failed to connect to any address"),
    })
}
