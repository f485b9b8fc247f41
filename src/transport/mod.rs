//! Transport Module
//!
//! Exact-length reads and writes over one persistent connection.
//!
//! ## Architecture
//! - `Transport<S>` works over any `Read + Write` stream
//! - TCP specifics (connect, deadlines, shutdown) live in `tcp`

mod stream;
mod tcp;

pub use stream::{DuplexStream, Transport};
pub use tcp::Canceller;
