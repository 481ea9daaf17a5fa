use std::error::Error as StdError;
use std::fmt;

/// A Result alias where the Err case is `mqtunnel_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur configuring a proxy or negotiating a tunnel.
pub struct Error {
    pub inner: Box<Inner>,
}

pub struct Inner {
    pub kind: Kind,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Bad configuration input (empty host, port out of range)
    InvalidArgument,
    /// A buffer or owned string could not be allocated
    OutOfMemory,
    /// The formatted CONNECT request does not fit the request capacity
    RequestTooLarge,
    /// Write, poll or read failure on the proxy socket
    Transport,
    /// No readiness within the response budget
    Timeout,
    /// Proxy closed the connection before the header terminator
    ConnectionClosed,
    /// Response buffer exhausted before the header terminator
    ResponseTooLarge,
    /// Proxy answered with something other than a 200 status
    ProxyRejected {
        status_line: String,
        status: Option<http::StatusCode>,
    },
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner { kind, source: None }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("mqtunnel_client::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            Kind::InvalidArgument => f.write_str("invalid proxy configuration")?,
            Kind::OutOfMemory => f.write_str("out of memory")?,
            Kind::RequestTooLarge => f.write_str("proxy CONNECT request too long")?,
            Kind::Transport => f.write_str("proxy transport error")?,
            Kind::Timeout => f.write_str("proxy connect timed out")?,
            Kind::ConnectionClosed => f.write_str("proxy connection closed prematurely")?,
            Kind::ResponseTooLarge => {
                f.write_str("proxy response headers too long or incomplete")?;
            }
            Kind::ProxyRejected { status_line, .. } => {
                write!(f, "proxy CONNECT failed: {status_line}")?;
            }
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
