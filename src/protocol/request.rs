//! Request definitions
//!
//! Represents requests sent by clients.

use super::{Action, ValueType};

/// A protocol request
///
/// Which fields are present depends on the action; the constructors
/// below fill in exactly the fields each action uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub action: Action,

    /// Absolute, slash-terminated node path (`/`, `/sub/`)
    pub node_path: Option<String>,

    pub key: Option<String>,

    /// `None` means "no type", which is not the same as `Bool`
    pub value_type: Option<ValueType>,

    /// Textual form of the value (PUT only)
    pub value: Option<String>,
}

impl Request {
    fn new(action: Action) -> Self {
        Self {
            action,
            node_path: None,
            key: None,
            value_type: None,
            value: None,
        }
    }

    fn at(mut self, node_path: &str) -> Self {
        self.node_path = Some(node_path.to_string());
        self
    }

    fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Does the node exist?
    pub fn node_exists(node_path: &str) -> Self {
        Self::new(Action::NodeExists).at(node_path)
    }

    /// Does an attribute of this key and type exist on the node?
    pub fn attr_exists(node_path: &str, key: &str, value_type: ValueType) -> Self {
        Self::new(Action::AttrExists)
            .at(node_path)
            .with_key(key)
            .with_type(value_type)
    }

    /// Read the current value of an attribute
    pub fn get(node_path: &str, key: &str, value_type: ValueType) -> Self {
        Self::new(Action::Get)
            .at(node_path)
            .with_key(key)
            .with_type(value_type)
    }

    /// Write a new value (in textual form) to an attribute
    pub fn put(node_path: &str, key: &str, value_type: ValueType, value: &str) -> Self {
        let mut request = Self::new(Action::Put)
            .at(node_path)
            .with_key(key)
            .with_type(value_type);
        request.value = Some(value.to_string());
        request
    }

    /// List the names of the node's children
    pub fn get_children(node_path: &str) -> Self {
        Self::new(Action::GetChildren).at(node_path)
    }

    /// List the attribute keys on the node
    pub fn get_attributes(node_path: &str) -> Self {
        Self::new(Action::GetAttributes).at(node_path)
    }

    /// List the type names available for a key
    pub fn get_types(node_path: &str, key: &str) -> Self {
        Self::new(Action::GetTypes).at(node_path).with_key(key)
    }
}

/// Split an absolute, slash-terminated path into its components
///
/// `/` is the root. Returns `None` for relative paths, missing trailing
/// slash, or empty components.
pub fn path_components(path: &str) -> Option<Vec<&str>> {
    let inner = path.strip_prefix('/')?;
    if inner.is_empty() {
        return Some(Vec::new());
    }

    let inner = inner.strip_suffix('/')?;
    let components: Vec<&str> = inner.split('/').collect();
    if components.iter().any(|c| c.is_empty()) {
        return None;
    }
    Some(components)
}
