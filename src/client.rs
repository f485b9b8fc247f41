//! Protocol Client
//!
//! One connection, one request in flight.
//!
//! `execute` takes `&mut self`, so a second request cannot start until the
//! previous response has been read in full. Any transport or framing
//! failure tears the connection down: the protocol has no resync markers.

use std::net::TcpStream;

use crate::config::Config;
use crate::error::{ConfTreeError, Result};
use crate::protocol::{encode_request, read_response, Request, Response, ValueType};
use crate::transport::{Canceller, DuplexStream, Transport};

/// Synchronous client for the configuration protocol
pub struct Client<S: DuplexStream = TcpStream> {
    /// `None` once disconnected or torn down
    transport: Option<Transport<S>>,

    /// Round trips completed on this connection
    round_trips: u64,
}

impl Client<TcpStream> {
    /// Connect to a config server
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::connect_with(&Config::builder().server(host, port).build())
    }

    /// Connect using `config.server_addr` and the configured timeouts
    pub fn connect_with(config: &Config) -> Result<Self> {
        let transport = Transport::connect(&config.server_addr, config)?;
        Ok(Self::new(transport))
    }

    /// Handle that aborts in-flight calls from another thread
    pub fn canceller(&self) -> Result<Canceller> {
        self.transport
            .as_ref()
            .ok_or(ConfTreeError::NotConnected)?
            .canceller()
    }
}

impl<S: DuplexStream> Client<S> {
    /// Use an already connected transport
    pub fn new(transport: Transport<S>) -> Self {
        Self {
            transport: Some(transport),
            round_trips: 0,
        }
    }

    /// Send one request and wait for its response
    ///
    /// A remote ERROR comes back as an ordinary response. Errors returned
    /// from here are local: encoding failures leave the connection intact,
    /// everything else closes it.
    pub fn execute(&mut self, request: &Request) -> Result<Response> {
        let frame = encode_request(request)?;
        let transport = self.transport.as_mut().ok_or(ConfTreeError::NotConnected)?;

        let result = transport
            .write_all(&frame)
            .and_then(|_| read_response(transport));

        match result {
            Ok(response) => {
                self.round_trips += 1;
                tracing::trace!(
                    "{} {:?} {:?} -> {} ({}, {} bytes)",
                    request.action,
                    request.node_path,
                    request.key,
                    response.action,
                    response.value_type,
                    response.message.len()
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!("Request {} failed, closing connection: {}", request.action, e);
                self.teardown();
                Err(e)
            }
        }
    }

    /// Close the connection; calling it again does nothing
    pub fn disconnect(&mut self) {
        if self.transport.is_some() {
            tracing::debug!("Disconnecting after {} round trips", self.round_trips);
            self.teardown();
        }
    }

    fn teardown(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close() {
                tracing::debug!("Error closing {}: {}", transport.peer(), e);
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn round_trips(&self) -> u64 {
        self.round_trips
    }

    // =========================================================================
    // Convenience Calls
    // =========================================================================

    /// Does the node exist on the server?
    pub fn node_exists(&mut self, node_path: &str) -> Result<bool> {
        Ok(self.execute(&Request::node_exists(node_path))?.as_bool())
    }

    /// Does the node carry an attribute with this key and type?
    pub fn attr_exists(&mut self, node_path: &str, key: &str, value_type: ValueType) -> Result<bool> {
        Ok(self
            .execute(&Request::attr_exists(node_path, key, value_type))?
            .as_bool())
    }

    /// Current value in text form, `None` if the server declines
    pub fn get(&mut self, node_path: &str, key: &str, value_type: ValueType) -> Result<Option<String>> {
        let response = self.execute(&Request::get(node_path, key, value_type))?;
        if response.is_error() || !response.value_type.is_known() {
            return Ok(None);
        }
        Ok(Some(response.message))
    }

    /// Child node names, in server order
    pub fn children(&mut self, node_path: &str) -> Result<Vec<String>> {
        self.listing(&Request::get_children(node_path))
    }

    /// Attribute keys, in server order
    pub fn attributes(&mut self, node_path: &str) -> Result<Vec<String>> {
        self.listing(&Request::get_attributes(node_path))
    }

    /// Type names available for a key
    pub fn types(&mut self, node_path: &str, key: &str) -> Result<Vec<String>> {
        self.listing(&Request::get_types(node_path, key))
    }

    /// A remote error or a non-string answer both mean "nothing listed"
    fn listing(&mut self, request: &Request) -> Result<Vec<String>> {
        let response = self.execute(request)?;
        if !response.is_listing() {
            return Ok(Vec::new());
        }
        Ok(response.names().into_iter().map(str::to_string).collect())
    }
}

impl<S: DuplexStream> Drop for Client<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
