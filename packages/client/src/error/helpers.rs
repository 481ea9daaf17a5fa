//! Marker source types attached to errors for diagnostics.

use thiserror::Error;

/// A marker type to indicate that the negotiation budget elapsed.
#[derive(Debug, Error)]
#[error("proxy exchange incomplete after {elapsed_ms} ms (budget {budget_ms} ms)")]
pub struct TimedOut {
    pub budget_ms: u128,
    pub elapsed_ms: u128,
}

/// A marker type to indicate that the peer closed the connection.
#[derive(Debug, Error)]
#[error("connection closed after {received} bytes")]
pub struct ConnectionClosed {
    pub received: usize,
}

/// A marker type to indicate that a request exceeded its capacity.
#[derive(Debug, Error)]
#[error("request of {len} bytes exceeds capacity of {capacity} bytes")]
pub struct CapacityExceeded {
    pub len: usize,
    pub capacity: usize,
}

/// A marker type to indicate a short write.
#[derive(Debug, Error)]
#[error("wrote {written} of {expected} bytes")]
pub struct ShortWrite {
    pub written: usize,
    pub expected: usize,
}

/// A marker type to indicate the socket signalled an error condition while polling.
#[derive(Debug, Error)]
#[error("socket error during proxy connect")]
pub struct SocketFault;
