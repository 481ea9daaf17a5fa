//! HTTP CONNECT tunnel establishment
//!
//! Sends `CONNECT host:port` over an already-connected proxy socket, collects
//! the response header block under a single timeout budget, and accepts the
//! tunnel only on an `HTTP/1.x 200` status line.

use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;

use super::response_buffer::ResponseBuffer;
use super::transport::{ProxyTransport, Readiness};
use crate::config::TunnelConfig;
use crate::connect::tunnel::Tunnel;
use crate::error::{self, Result, ShortWrite, SocketFault};
use crate::proxy::ProxyConfig;

const ACCEPTED_STATUS: [&[u8]; 2] = [b"HTTP/1.1 200", b"HTTP/1.0 200"];

/// Back-off between write attempts while a non-blocking socket's send buffer is full.
const WRITE_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// Establish HTTP CONNECT tunnel through proxy with the reference budgets.
///
/// See [`negotiate_tunnel`].
///
/// # Errors
///
/// Same as [`negotiate_tunnel`].
pub fn establish_connect_tunnel<T: ProxyTransport>(
    proxy_stream: T,
    dest_host: &str,
    dest_port: u16,
    proxy: &ProxyConfig,
) -> Result<Tunnel<T>> {
    negotiate_tunnel(proxy_stream, dest_host, dest_port, proxy, &TunnelConfig::default())
}

/// Negotiate a CONNECT tunnel to `dest_host:dest_port` over `proxy_stream`.
///
/// `proxy_stream` must already be connected to the proxy described by `proxy`.
/// On success the returned [`Tunnel`] is ready for the wrapped protocol; bytes
/// the proxy sent past its header block are kept in the tunnel.
///
/// # Errors
///
/// - `InvalidArgument`: unset proxy config, empty destination host, a
///   destination host containing CR or LF, or port 0.
/// - `RequestTooLarge`: the request exceeds `config.request_capacity`; nothing is written.
/// - `OutOfMemory`: a buffer could not be allocated.
/// - `Transport`: write, poll or read failure.
/// - `Timeout`: the request could not be written, or the response headers did
///   not arrive, within `config.response_timeout`.
/// - `ConnectionClosed`: the proxy closed before the header terminator.
/// - `ResponseTooLarge`: the response buffer filled before the terminator.
/// - `ProxyRejected`: the status line is not `HTTP/1.1 200` or `HTTP/1.0 200`.
pub fn negotiate_tunnel<T: ProxyTransport>(
    mut proxy_stream: T,
    dest_host: &str,
    dest_port: u16,
    proxy: &ProxyConfig,
    config: &TunnelConfig,
) -> Result<Tunnel<T>> {
    let proxy_host = proxy
        .host()
        .ok_or_else(|| error::invalid_argument("proxy is not configured"))?;
    if dest_host.is_empty() || dest_port == 0 {
        return Err(error::invalid_argument("destination host and port are required"));
    }
    if dest_host.contains(['\r', '\n']) {
        return Err(error::invalid_argument("destination host must not contain CR or LF"));
    }

    let request = build_connect_request(
        dest_host,
        dest_port,
        proxy.auth_header_line(),
        config.request_capacity,
    )
    .inspect_err(|e| tracing::error!(error = %e, "Failed to build proxy CONNECT request"))?;

    let mut response = ResponseBuffer::with_capacity(config.response_capacity)?;

    tracing::debug!(
        proxy.host = %proxy_host,
        target.host = %dest_host,
        target.port = dest_port,
        auth = proxy.auth_header_line().is_some(),
        bytes = request.len(),
        "Sending CONNECT request"
    );

    let started = Instant::now();
    write_request(&mut proxy_stream, request.as_bytes(), started, config.response_timeout)
        .inspect_err(|e| tracing::error!(error = %e, "Error writing to proxy"))?;

    let header_end =
        read_response_head(&mut proxy_stream, &mut response, started, config.response_timeout)?;
    let head = &response.filled()[..header_end];

    check_status(head).inspect_err(|e| tracing::error!(error = %e, "Proxy refused tunnel"))?;

    let leftover = Bytes::copy_from_slice(&response.filled()[header_end..]);
    if !leftover.is_empty() {
        tracing::debug!(bytes = leftover.len(), "Keeping bytes received after proxy headers");
    }

    tracing::info!(
        proxy.host = %proxy_host,
        proxy.port = proxy.port(),
        target.host = %dest_host,
        target.port = dest_port,
        "Successfully connected to destination via proxy"
    );

    Ok(Tunnel::new(proxy_stream, leftover))
}

/// Format the CONNECT request, rejecting it if it exceeds `capacity` bytes.
pub(crate) fn build_connect_request(
    dest_host: &str,
    dest_port: u16,
    auth_header_line: Option<&str>,
    capacity: usize,
) -> Result<String> {
    let authority = format!("{dest_host}:{dest_port}");
    let auth_header_line = auth_header_line.unwrap_or("");

    let parts = [
        "CONNECT ",
        authority.as_str(),
        " HTTP/1.1\r\nHost: ",
        authority.as_str(),
        "\r\n",
        auth_header_line,
        "\r\n",
    ];
    let len: usize = parts.iter().map(|part| part.len()).sum();
    if len > capacity {
        return Err(error::request_too_large(len, capacity));
    }

    let mut request = String::new();
    request
        .try_reserve_exact(len)
        .map_err(error::out_of_memory)?;
    for part in parts {
        request.push_str(part);
    }
    Ok(request)
}

/// Write the whole request; `WouldBlock` is retried until `budget` has elapsed since `started`.
fn write_request<W: Write>(
    stream: &mut W,
    request: &[u8],
    started: Instant,
    budget: Duration,
) -> Result<()> {
    let mut written = 0;
    while written < request.len() {
        match stream.write(&request[written..]) {
            Ok(0) => {
                return Err(error::transport(ShortWrite {
                    written,
                    expected: request.len(),
                }));
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                let remaining = budget.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    return Err(error::timeout(budget, started.elapsed()));
                }
                thread::sleep(WRITE_RETRY_INTERVAL.min(remaining));
            }
            Err(e) => return Err(error::transport(e)),
        }
    }
    stream.flush().map_err(error::transport)
}

/// Read until `\r\n\r\n`, returning the offset just past it.
fn read_response_head<T: ProxyTransport>(
    stream: &mut T,
    response: &mut ResponseBuffer,
    started: Instant,
    budget: Duration,
) -> Result<usize> {
    while !response.is_full() {
        let remaining = budget.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            tracing::error!(elapsed_ms = started.elapsed().as_millis(), "Proxy connect timed out");
            return Err(error::timeout(budget, started.elapsed()));
        }

        match stream.poll_readable(remaining) {
            Ok(Readiness::Readable) => {}
            Ok(Readiness::TimedOut) => {
                tracing::error!(
                    elapsed_ms = started.elapsed().as_millis(),
                    "Proxy connect timed out"
                );
                return Err(error::timeout(budget, started.elapsed()));
            }
            Ok(Readiness::Fault) => {
                tracing::error!("Proxy socket error during connect");
                return Err(error::transport(SocketFault));
            }
            Err(e) => {
                tracing::error!(error = %e, "Proxy poll error");
                return Err(error::transport(e));
            }
        }

        let n = match stream.read(response.unfilled_mut()) {
            Ok(0) => {
                tracing::error!(
                    received = response.filled().len(),
                    "Proxy connection closed prematurely"
                );
                return Err(error::connection_closed(response.filled().len()));
            }
            Ok(n) => n,
            Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) => {
                continue;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error reading from proxy");
                return Err(error::transport(e));
            }
        };

        response.advance(n);
        tracing::debug!(bytes = n, total = response.filled().len(), "Read from proxy");

        if let Some(header_end) = response.find_terminator() {
            return Ok(header_end);
        }
    }

    tracing::error!(
        capacity = response.capacity(),
        "Proxy response headers too long or incomplete"
    );
    Err(error::response_too_large(response.capacity()))
}

/// Accept only `HTTP/1.1 200` and `HTTP/1.0 200` status lines.
fn check_status(head: &[u8]) -> Result<()> {
    if ACCEPTED_STATUS.iter().any(|accepted| head.starts_with(accepted)) {
        return Ok(());
    }

    let line_end = memchr::memmem::find(head, b"\r\n").unwrap_or(head.len());
    let status_line = String::from_utf8_lossy(&head[..line_end]);
    Err(error::proxy_rejected(status_line))
}
