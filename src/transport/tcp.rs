//! TCP transport
//!
//! Connects to the config server and applies the configured deadlines.

use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::{DuplexStream, Transport};
use crate::config::Config;
use crate::error::{ConfTreeError, Result};

impl DuplexStream for TcpStream {
    fn close(&mut self) -> std::io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            // Already closed by the peer
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

impl Transport<TcpStream> {
    /// Connect to `addr` using the timeouts from `config`
    ///
    /// Every resolved address is tried in turn; the last failure is reported.
    pub fn connect(addr: &str, config: &Config) -> Result<Self> {
        let addrs = addr
            .to_socket_addrs()
            .map_err(|e| ConfTreeError::Connection(format!("cannot resolve {}: {}", addr, e)))?;

        let mut last_error = None;
        for socket_addr in addrs {
            let attempt = if config.connect_timeout_ms > 0 {
                TcpStream::connect_timeout(&socket_addr, Duration::from_millis(config.connect_timeout_ms))
            } else {
                TcpStream::connect(socket_addr)
            };

            match attempt {
                Ok(stream) => {
                    let mut transport = Self::from_stream(stream)?;
                    transport.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
                    tracing::debug!("Connected to {}", transport.peer());
                    return Ok(transport);
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", socket_addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(ConfTreeError::Connection(match last_error {
            Some(e) => format!("cannot connect to {}: {}", addr, e),
            None => format!("no addresses found for {}", addr),
        }))
    }

    /// Wrap an accepted or connected socket
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Requests are small and strictly alternating, Nagle only adds latency
        stream.set_nodelay(true)?;

        Ok(Self::with_peer(stream, peer))
    }

    /// Configure read/write deadlines (0 disables)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let stream = self.get_ref();

        stream.set_read_timeout((read_ms > 0).then(|| Duration::from_millis(read_ms)))?;
        stream.set_write_timeout((write_ms > 0).then(|| Duration::from_millis(write_ms)))?;

        Ok(())
    }

    /// Handle that can close this socket from another thread
    pub fn canceller(&self) -> Result<Canceller> {
        Ok(Canceller {
            stream: self.get_ref().try_clone()?,
        })
    }
}

/// Aborts blocking calls on a connection by shutting its socket down
///
/// Any read or write in progress on the owning transport then fails with
/// a connection error.
#[derive(Debug)]
pub struct Canceller {
    stream: TcpStream,
}

impl Canceller {
    pub fn cancel(&self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::debug!("Cancel on closed socket: {}", e);
        }
    }
}
