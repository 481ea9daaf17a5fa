use std::collections::TryReserveError;
use std::time::Duration;

use super::types::{Error, Kind};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates an `Error` for invalid configuration input.
pub fn invalid_argument<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidArgument).with(e.into())
}

/// Creates an `Error` for a failed allocation.
pub fn out_of_memory(e: TryReserveError) -> Error {
    Error::new(Kind::OutOfMemory).with(e)
}

/// Creates an `Error` for a CONNECT request that does not fit its buffer.
pub fn request_too_large(len: usize, capacity: usize) -> Error {
    Error::new(Kind::RequestTooLarge).with(super::helpers::CapacityExceeded { len, capacity })
}

/// Creates an `Error` for a write, poll or read failure.
pub fn transport<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Transport).with(e.into())
}

/// Creates an `Error` for an exhausted response budget.
///
/// `elapsed` is the wait actually observed, which can be shorter than
/// `budget` when the transport reports a timeout early.
pub fn timeout(budget: Duration, elapsed: Duration) -> Error {
    Error::new(Kind::Timeout).with(super::helpers::TimedOut {
        budget_ms: budget.as_millis(),
        elapsed_ms: elapsed.as_millis(),
    })
}

/// Creates an `Error` for a peer that closed before the header terminator.
pub fn connection_closed(received: usize) -> Error {
    Error::new(Kind::ConnectionClosed).with(super::helpers::ConnectionClosed { received })
}

/// Creates an `Error` for a response that filled the buffer without a terminator.
pub fn response_too_large(capacity: usize) -> Error {
    Error::new(Kind::ResponseTooLarge).with(super::helpers::CapacityExceeded {
        len: capacity,
        capacity,
    })
}

/// Creates an `Error` for a non-200 proxy reply.
///
/// The numeric status is parsed from the second token of the status line when
/// it is a valid HTTP status code.
pub fn proxy_rejected(status_line: impl Into<String>) -> Error {
    let status_line = status_line.into();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| http::StatusCode::from_bytes(code.as_bytes()).ok());
    Error::new(Kind::ProxyRejected {
        status_line,
        status,
    })
}
