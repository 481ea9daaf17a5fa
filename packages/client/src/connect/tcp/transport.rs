//! Socket primitives consumed by the CONNECT negotiator
//!
//! Reads and writes come from `std::io::{Read, Write}`; readiness polling is
//! the one extra primitive a proxy transport has to provide.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

#[cfg(unix)]
use socket2::SockRef;

/// Outcome of a readiness poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Data (or end-of-stream) is available to read.
    Readable,
    /// Nothing arrived within the timeout.
    TimedOut,
    /// The socket reported an error condition instead of readability.
    Fault,
}

/// A connected socket to an HTTP proxy.
pub trait ProxyTransport: Read + Write {
    /// Blocks until the transport is readable, faults, or `timeout` elapses.
    ///
    /// `timeout` is never zero.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if polling itself fails.
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<Readiness>;
}

/// Polls by peeking in blocking mode under a temporary read timeout.
///
/// Works for blocking and non-blocking streams alike: a non-blocking stream is
/// switched to blocking for the wait, and both its mode and its read timeout
/// are restored before returning.
impl ProxyTransport for TcpStream {
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<Readiness> {
        let previous = self.read_timeout()?;
        let mut nonblocking = is_nonblocking(self)?;

        let outcome = wait_readable(self, timeout, &mut nonblocking);
        let restored = restore_mode(self, previous, nonblocking);

        let readiness = outcome?;
        restored?;
        Ok(readiness)
    }
}

#[cfg(unix)]
fn is_nonblocking(stream: &TcpStream) -> io::Result<bool> {
    SockRef::from(stream).nonblocking()
}

/// The mode cannot be queried here; `wait_readable` discovers it from the first peek.
#[cfg(not(unix))]
fn is_nonblocking(_stream: &TcpStream) -> io::Result<bool> {
    Ok(false)
}

fn wait_readable(
    stream: &TcpStream,
    timeout: Duration,
    nonblocking: &mut bool,
) -> io::Result<Readiness> {
    if *nonblocking {
        stream.set_nonblocking(false)?;
    }
    stream.set_read_timeout(Some(timeout))?;
    #[cfg(not(unix))]
    let started = std::time::Instant::now();

    // peek() blocks like poll(POLLIN) without consuming; Ok(0) is EOF,
    // which the following read reports as a closed connection.
    let mut probe = [0u8; 1];
    loop {
        match stream.peek(&mut probe) {
            Ok(_) => return Ok(Readiness::Readable),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            // Timed-out blocking reads report TimedOut here, so WouldBlock
            // means the stream was non-blocking.
            #[cfg(not(unix))]
            Err(e) if e.kind() == io::ErrorKind::WouldBlock && !*nonblocking => {
                *nonblocking = true;
                stream.set_nonblocking(false)?;
                let remaining = timeout.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    return Ok(Readiness::TimedOut);
                }
                stream.set_read_timeout(Some(remaining))?;
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Ok(Readiness::TimedOut);
            }
            Err(e) => return Err(e),
        }
    }
}

fn restore_mode(
    stream: &TcpStream,
    read_timeout: Option<Duration>,
    nonblocking: bool,
) -> io::Result<()> {
    stream.set_read_timeout(read_timeout)?;
    if nonblocking {
        stream.set_nonblocking(true)?;
    }
    Ok(())
}

impl<T: ProxyTransport + ?Sized> ProxyTransport for &mut T {
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<Readiness> {
        (**self).poll_readable(timeout)
    }
}

impl<T: ProxyTransport + ?Sized> ProxyTransport for Box<T> {
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<Readiness> {
        (**self).poll_readable(timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    fn pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let client = TcpStream::connect(addr).expect("connect loopback");
        let (server, _) = listener.accept().expect("accept loopback");
        (client, server)
    }

    #[test]
    fn tcp_poll_times_out_without_data() {
        let (mut client, _server) = pair();
        let readiness = client
            .poll_readable(Duration::from_millis(50))
            .expect("poll succeeds");
        assert_eq!(readiness, Readiness::TimedOut);
    }

    #[test]
    fn tcp_poll_sees_pending_data_and_restores_timeout() {
        let (mut client, mut server) = pair();
        server.write_all(b"x").expect("server write");
        let readiness = client
            .poll_readable(Duration::from_secs(5))
            .expect("poll succeeds");
        assert_eq!(readiness, Readiness::Readable);
        assert_eq!(client.read_timeout().expect("read timeout"), None);
    }

    #[test]
    fn tcp_poll_waits_on_nonblocking_stream_and_restores_mode() {
        let (mut client, mut server) = pair();
        client.set_nonblocking(true).expect("nonblocking");
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            server.write_all(b"x").expect("server write");
            server
        });

        let readiness = client
            .poll_readable(Duration::from_secs(5))
            .expect("poll succeeds");
        assert_eq!(readiness, Readiness::Readable);

        let mut byte = [0u8; 1];
        assert_eq!(client.read(&mut byte).expect("data is ready"), 1);
        let err = client.read(&mut byte).expect_err("stream is non-blocking again");
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        drop(writer.join().expect("writer thread"));
    }

    #[test]
    fn tcp_poll_times_out_on_nonblocking_stream() {
        let (mut client, _server) = pair();
        client.set_nonblocking(true).expect("nonblocking");
        let started = std::time::Instant::now();
        let readiness = client
            .poll_readable(Duration::from_millis(100))
            .expect("poll succeeds");
        assert_eq!(readiness, Readiness::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn tcp_poll_reports_eof_as_readable() {
        let (mut client, server) = pair();
        drop(server);
        let readiness = client
            .poll_readable(Duration::from_secs(5))
            .expect("poll succeeds");
        assert_eq!(readiness, Readiness::Readable);
    }
}
