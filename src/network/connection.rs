//! Connection Handler
//!
//! Serves one client connection against the shared store.

use std::net::TcpStream;

use crate::error::{ConfTreeError, Result};
use crate::protocol::{read_request, write_response, Response};
use crate::store::{ConfigStore, UNKNOWN_ACTION};
use crate::transport::Transport;

/// Handles a single client connection
pub struct Connection {
    transport: Transport<TcpStream>,

    /// Shared configuration tree
    store: ConfigStore,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, store: ConfigStore) -> Result<Self> {
        Ok(Self {
            transport: Transport::from_stream(stream)?,
            store,
        })
    }

    /// Configure connection timeouts (0 disables)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        self.transport.set_timeouts(read_ms, write_ms)
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads requests in a loop and sends one response for each.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr());

        loop {
            let response = match read_request(&mut self.transport) {
                Ok(request) => {
                    tracing::trace!("Received request from {}: {:?}", self.peer_addr(), request);
                    self.store.handle(&request)
                }
                Err(ConfTreeError::ConnectionClosed) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr());
                    return Ok(());
                }
                Err(ConfTreeError::Timeout) => {
                    tracing::debug!("Read timeout for client {}", self.peer_addr());
                    return Ok(());
                }
                Err(ConfTreeError::Connection(reason)) => {
                    tracing::debug!("Connection to {} lost: {}", self.peer_addr(), reason);
                    return Ok(());
                }
                // The frame was consumed in full, so the stream is still in sync
                Err(ConfTreeError::UnknownAction(code)) => {
                    tracing::warn!("Unknown action 0x{:02x} from {}", code, self.peer_addr());
                    Response::error(UNKNOWN_ACTION)
                }
                Err(e @ (ConfTreeError::Protocol(_) | ConfTreeError::UnknownType(_))) => {
                    tracing::warn!("Bad request from {}: {}", self.peer_addr(), e);
                    Response::error(e.to_string())
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr(), e);
                    return Err(e);
                }
            };

            match write_response(&mut self.transport, &response) {
                Ok(()) => {}
                Err(ConfTreeError::ConnectionClosed | ConfTreeError::Connection(_)) => {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent",
                        self.peer_addr()
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error writing to {}: {}", self.peer_addr(), e);
                    return Err(e);
                }
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        self.transport.peer()
    }
}
