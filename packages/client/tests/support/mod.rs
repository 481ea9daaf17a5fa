//! Scripted in-memory proxy used by the negotiation tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;

use mqtunnel_client::{ProxyTransport, Readiness};

/// One scripted proxy behaviour, consumed in order.
#[derive(Debug, Clone)]
pub enum Step {
    /// Bytes delivered by the next read (split if the read buffer is smaller).
    Data(Vec<u8>),
    /// The next poll times out.
    Silence,
    /// The proxy closed the connection; every later read returns 0.
    Close,
    /// The next read fails with this error kind.
    ReadError(io::ErrorKind),
    /// The next poll reports a socket fault.
    Fault,
    /// The next poll itself fails.
    PollError,
}

#[derive(Debug, Default)]
pub struct ScriptedProxy {
    steps: VecDeque<Step>,
    /// Everything the negotiator wrote.
    pub written: Vec<u8>,
    /// Timeout passed to every poll, in order.
    pub polls: Vec<Duration>,
    /// Maximum bytes accepted per write call.
    pub write_chunk: Option<usize>,
    /// Fail every write with this kind.
    pub write_error: Option<io::ErrorKind>,
    /// Accept zero bytes on every write.
    pub write_zero: bool,
    /// Number of writes that fail with `WouldBlock` before any is accepted.
    pub write_would_block: usize,
}

impl ScriptedProxy {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A proxy that answers with `response` in a single read.
    pub fn replying(response: &[u8]) -> Self {
        Self::new([Step::Data(response.to_vec())])
    }

    /// A proxy that answers with `response` split into `size`-byte reads.
    pub fn fragmented(response: &[u8], size: usize) -> Self {
        Self::new(response.chunks(size).map(|chunk| Step::Data(chunk.to_vec())))
    }

    pub fn written_str(&self) -> &str {
        std::str::from_utf8(&self.written).expect("request is ASCII")
    }
}

impl Read for ScriptedProxy {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            Some(Step::Data(mut bytes)) => {
                let n = buf.len().min(bytes.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.steps.push_front(Step::Data(bytes.split_off(n)));
                }
                Ok(n)
            }
            Some(Step::Close) | None => {
                self.steps.push_front(Step::Close);
                Ok(0)
            }
            Some(Step::ReadError(kind)) => Err(io::Error::from(kind)),
            Some(other) => panic!("read called while script expects {other:?}"),
        }
    }
}

impl Write for ScriptedProxy {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(kind) = self.write_error {
            return Err(io::Error::from(kind));
        }
        if self.write_zero {
            return Ok(0);
        }
        if self.write_would_block > 0 {
            self.write_would_block -= 1;
            return Err(io::Error::from(io::ErrorKind::WouldBlock));
        }
        let n = self.write_chunk.map_or(buf.len(), |chunk| chunk.min(buf.len()));
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ProxyTransport for ScriptedProxy {
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<Readiness> {
        self.polls.push(timeout);
        match self.steps.front() {
            None | Some(Step::Silence) => {
                self.steps.pop_front();
                Ok(Readiness::TimedOut)
            }
            Some(Step::Fault) => {
                self.steps.pop_front();
                Ok(Readiness::Fault)
            }
            Some(Step::PollError) => {
                self.steps.pop_front();
                Err(io::Error::from(io::ErrorKind::ConnectionReset))
            }
            Some(_) => Ok(Readiness::Readable),
        }
    }
}
