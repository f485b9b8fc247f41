//! Network Module
//!
//! Reference TCP server for the configuration protocol.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One handler thread per connected client
//! - Requests answered from a shared `ConfigStore`

mod server;
mod connection;

pub use server::{Server, ServerHandle};
pub use connection::Connection;
