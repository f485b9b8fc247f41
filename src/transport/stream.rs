//! Byte-exact transfers over a duplex stream

use std::io::{ErrorKind, Read, Write};

use crate::error::{ConfTreeError, Result};

/// A byte stream a transport can run over
///
/// `close` must make the stream unusable for both directions; the default
/// does nothing and leaves closing to `Drop`.
pub trait DuplexStream: Read + Write {
    fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A connected duplex stream with exact-length reads and writes
///
/// Short reads and short writes are normal; both loops keep going until
/// the full length has moved or the stream fails for good.
pub struct Transport<S> {
    stream: S,

    /// Peer description for logging
    peer: String,
}

impl<S: DuplexStream> Transport<S> {
    /// Wrap an already connected stream
    pub fn new(stream: S) -> Self {
        Self::with_peer(stream, "stream")
    }

    pub fn with_peer(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream,
            peer: peer.into(),
        }
    }

    /// Write every byte of `buf`
    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;

        while written < buf.len() {
            match self.stream.write(&buf[written..]) {
                Ok(0) => return Err(ConfTreeError::ConnectionClosed),
                Ok(n) => {
                    written += n;
                    if written < buf.len() {
                        tracing::trace!(
                            "Partial write to {}: {}/{} bytes",
                            self.peer,
                            written,
                            buf.len()
                        );
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(e)),
            }
        }

        loop {
            match self.stream.flush() {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(e)),
            }
        }
    }

    /// Read exactly `n` bytes
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.read_exact_into(&mut buf)?;
        Ok(buf)
    }

    /// Fill `buf` completely
    ///
    /// Fails with `ConnectionClosed` if the peer closes first.
    pub fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => return Err(ConfTreeError::ConnectionClosed),
                Ok(n) => {
                    filled += n;
                    if filled < buf.len() {
                        tracing::trace!(
                            "Partial read from {}: {}/{} bytes",
                            self.peer,
                            filled,
                            buf.len()
                        );
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(e)),
            }
        }

        Ok(())
    }

    /// Close the underlying stream
    pub fn close(&mut self) -> Result<()> {
        self.stream.close().map_err(map_io_error)
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Sort I/O failures into the connection error family
fn map_io_error(e: std::io::Error) -> ConfTreeError {
    match e.kind() {
        // Read/write deadlines surface as WouldBlock on Unix and TimedOut on Windows
        ErrorKind::WouldBlock | ErrorKind::TimedOut => ConfTreeError::Timeout,
        ErrorKind::UnexpectedEof => ConfTreeError::ConnectionClosed,
        ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe
        | ErrorKind::NotConnected => ConfTreeError::Connection(e.to_string()),
        _ => ConfTreeError::Io(e),
    }
}
