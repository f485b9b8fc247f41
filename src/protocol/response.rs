//! Response definitions
//!
//! Represents responses from the config server.

use super::{Action, ValueType};

/// Separator between entries of a listing message
pub const NAME_SEPARATOR: char = '\0';

/// A decoded response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Echo of the request action, or `Error`
    pub action: Action,

    /// How to interpret `message`
    pub value_type: ValueType,

    /// Payload without its trailing NUL
    pub message: String,
}

impl Response {
    pub fn new(action: Action, value_type: ValueType, message: impl Into<String>) -> Self {
        Self {
            action,
            value_type,
            message: message.into(),
        }
    }

    /// Create an ERROR response carrying a message
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Action::Error, ValueType::String, message)
    }

    /// Create a boolean answer (NODE_EXISTS, ATTR_EXISTS, PUT acknowledgement)
    pub fn boolean(action: Action, result: bool) -> Self {
        Self::new(action, ValueType::Bool, if result { "true" } else { "false" })
    }

    /// Create a NUL-separated listing (GET_CHILDREN, GET_ATTRIBUTES, GET_TYPES)
    pub fn listing<I, S>(action: Action, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut message = String::new();
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                message.push(NAME_SEPARATOR);
            }
            message.push_str(name.as_ref());
        }
        Self::new(action, ValueType::String, message)
    }

    pub fn is_error(&self) -> bool {
        self.action == Action::Error
    }

    /// True if this response carries a NUL-separated listing
    pub fn is_listing(&self) -> bool {
        !self.is_error() && self.value_type == ValueType::String
    }

    /// Split the message into names, in server order
    ///
    /// An empty message yields no names. Trailing separators are ignored,
    /// empty entries between two names are kept as received.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.message.split(NAME_SEPARATOR).collect();
        while names.last().is_some_and(|name| name.is_empty()) {
            names.pop();
        }
        names
    }

    /// Interpret a boolean answer; anything other than `"true"` is false
    pub fn as_bool(&self) -> bool {
        !self.is_error() && self.message == "true"
    }
}
