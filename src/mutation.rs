//! Mutation Path
//!
//! Single attribute writes. The server is authoritative for ranges and
//! existence; locally we only make sure the value has a textual form.
//! Writes never refresh a discovered tree.

use crate::client::Client;
use crate::error::Result;
use crate::protocol::{Action, Request, Value, ValueType};
use crate::transport::DuplexStream;

/// Result of a PUT the server answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Server echoed PUT
    Applied,

    /// Server answered ERROR; the connection stays usable
    Rejected(String),
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}

/// Write a typed value to `key` on `node_path`
pub fn set_value<S: DuplexStream>(
    client: &mut Client<S>,
    node_path: &str,
    key: &str,
    value: &Value,
) -> Result<WriteOutcome> {
    let text = value.to_string();
    let request = Request::put(node_path, key, value.value_type(), &text);
    let response = client.execute(&request)?;

    if response.action == Action::Put {
        tracing::debug!("Set {}{} ({}) = {}", node_path, key, value.value_type(), text);
        Ok(WriteOutcome::Applied)
    } else {
        tracing::debug!(
            "Server rejected {}{} ({}) = {}: {}",
            node_path,
            key,
            value.value_type(),
            text,
            response.message
        );
        Ok(WriteOutcome::Rejected(response.message))
    }
}

/// Write a value given as text, e.g. straight from a user edit
///
/// Fails with `ValueFormat` before anything is sent if `text` is not a
/// valid `value_type`.
pub fn set_value_text<S: DuplexStream>(
    client: &mut Client<S>,
    node_path: &str,
    key: &str,
    value_type: ValueType,
    text: &str,
) -> Result<WriteOutcome> {
    let value = Value::parse(value_type, text)?;
    set_value(client, node_path, key, &value)
}
