//! # conftree
//!
//! Client for a remote hierarchical configuration store spoken to over TCP
//! with a compact binary request/response protocol:
//! - Wire codec for requests and responses
//! - Exact-length transport with short read/write handling
//! - Synchronous client, one request in flight per connection
//! - Discovery of the whole remote tree into an in-memory mirror
//! - Single attribute writes
//! - Reference server over an in-memory store
//! - Line parsing and tab completion for an interactive shell
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            Discovery Engine / Mutation Path                  │
//! │        (tree walk, single attribute writes)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Protocol Client                            │
//! │          (execute: request -> response, &mut self)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Codec    │          │  Transport  │
//!   │ (frames)    │          │ (exact I/O) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ TCP Server  │
//!                           │   (store)   │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use conftree::{discover, set_value, Client, Value};
//!
//! let mut client = Client::connect("127.0.0.1", 4040)?;
//! let tree = discover(&mut client)?;
//! for node in tree.iter() {
//!     println!("{} ({} attributes)", node.path, node.attributes.len());
//! }
//! set_value(&mut client, "/sensor/", "exposure", &Value::Int(8000))?;
//! client.disconnect();
//! # Ok::<(), conftree::ConfTreeError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transport;
pub mod client;
pub mod discovery;
pub mod mutation;
pub mod store;
pub mod network;
pub mod shell;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ConfTreeError, Result};
pub use config::Config;
pub use client::Client;
pub use discovery::{discover, discover_from, Attribute, ConfigNode};
pub use mutation::{set_value, set_value_text, WriteOutcome};
pub use protocol::{Action, Request, Response, Value, ValueType};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of conftree
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
