//! Bounded accumulation buffer for proxy response headers.

use memchr::memmem;

use crate::error::{self, Result};

pub(crate) const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Fixed-capacity buffer that collects fragmented response bytes.
///
/// The last byte of the capacity is reserved; the byte after the filled
/// region is always zero.
pub struct ResponseBuffer {
    buf: Vec<u8>,
    filled: usize,
    scanned: usize,
}

impl ResponseBuffer {
    /// Allocates a zeroed buffer of `capacity` bytes.
    ///
    /// # Errors
    ///
    /// `OutOfMemory` if the allocation fails; `InvalidArgument` for a zero capacity.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(error::invalid_argument("response capacity must be positive"));
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(error::out_of_memory)?;
        buf.resize(capacity, 0);
        Ok(Self {
            buf,
            filled: 0,
            scanned: 0,
        })
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes received so far.
    #[must_use]
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// True once only the reserved byte is left.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.filled + 1 >= self.buf.len()
    }

    /// Writable region for the next read, excluding the reserved byte.
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        let end = self.buf.len() - 1;
        &mut self.buf[self.filled..end]
    }

    /// Marks `n` bytes of [`unfilled_mut`](Self::unfilled_mut) as received.
    pub fn advance(&mut self, n: usize) {
        self.filled = (self.filled + n).min(self.buf.len() - 1);
        self.buf[self.filled] = 0;
    }

    /// Returns the offset just past the first `\r\n\r\n`, if received.
    ///
    /// Only bytes appended since the previous call are searched, plus the
    /// last three bytes before them so a terminator split across reads is found.
    pub fn find_terminator(&mut self) -> Option<usize> {
        let from = self.scanned.saturating_sub(HEADER_TERMINATOR.len() - 1);
        let found = memmem::find(&self.buf[from..self.filled], HEADER_TERMINATOR)
            .map(|pos| from + pos + HEADER_TERMINATOR.len());
        self.scanned = self.filled;
        found
    }
}
