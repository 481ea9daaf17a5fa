//! Established CONNECT tunnel
//!
//! Wraps the proxy socket once the proxy has accepted the tunnel. Any bytes
//! the proxy sent after its header block are kept and served before new
//! socket data, so the wrapped protocol sees an unbroken byte stream.

use std::io::{self, Read, Write};

use bytes::{Buf, Bytes};

/// A socket tunneled through an HTTP proxy to its destination.
#[derive(Debug)]
pub struct Tunnel<T> {
    inner: T,
    leftover: Bytes,
}

impl<T> Tunnel<T> {
    pub(crate) fn new(inner: T, leftover: Bytes) -> Self {
        Self { inner, leftover }
    }

    /// Bytes received after the proxy's header block that have not been read yet.
    #[must_use]
    pub fn leftover(&self) -> &[u8] {
        &self.leftover
    }

    #[must_use]
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutable access to the socket.
    ///
    /// Reading from it directly skips any [`leftover`](Self::leftover) bytes.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Splits the tunnel into the socket and the unread trailing bytes.
    pub fn into_parts(self) -> (T, Bytes) {
        (self.inner, self.leftover)
    }
}

impl<T: Read> Read for Tunnel<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.leftover.is_empty() {
            return self.inner.read(buf);
        }
        let n = buf.len().min(self.leftover.len());
        buf[..n].copy_from_slice(&self.leftover[..n]);
        self.leftover.advance(n);
        Ok(n)
    }
}

impl<T: Write> Write for Tunnel<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
