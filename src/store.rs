//! Configuration Store
//!
//! In-memory configuration tree served by the reference server.
//!
//! ## Rules
//! - Remote requests only read or change what already exists; nodes and
//!   attributes are created locally (`set`, `create_node`)
//! - An attribute is identified by key *and* type, so one key can hold
//!   several typed values
//! - Children and attributes keep insertion order

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ConfTreeError, Result};
pub use crate::protocol::path_components;
use crate::protocol::{Action, Request, Response, Value, ValueType};

const NODE_MISSING: &str = "Node doesn't exist. Operations are only allowed on existing data.";
/// Answer to a request whose action the server does not know
pub const UNKNOWN_ACTION: &str = "Unknown action.";

const ATTR_MISSING: &str =
    "Attribute of given type doesn't exist. Operations are only allowed on existing data.";

#[derive(Debug, Default)]
struct StoreNode {
    attributes: Vec<(String, Value)>,
    children: Vec<(String, StoreNode)>,
}

impl StoreNode {
    fn child(&self, name: &str) -> Option<&StoreNode> {
        self.children
            .iter()
            .find(|(child, _)| child == name)
            .map(|(_, node)| node)
    }

    fn child_or_insert(&mut self, name: &str) -> &mut StoreNode {
        let index = match self.children.iter().position(|(child, _)| child == name) {
            Some(index) => index,
            None => {
                self.children.push((name.to_string(), StoreNode::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    fn attribute(&self, key: &str, value_type: ValueType) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(k, v)| k == key && v.value_type() == value_type)
            .map(|(_, v)| v)
    }

    fn attribute_mut(&mut self, key: &str, value_type: ValueType) -> Option<&mut Value> {
        self.attributes
            .iter_mut()
            .find(|(k, v)| k == key && v.value_type() == value_type)
            .map(|(_, v)| v)
    }

    /// Distinct keys in order of first appearance
    fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in &self.attributes {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }

    fn types(&self, key: &str) -> Vec<ValueType> {
        self.attributes
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.value_type())
            .collect()
    }
}

/// Shared configuration tree
///
/// Cloning gives another handle to the same tree.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    root: Arc<RwLock<StoreNode>>,
}

impl ConfigStore {
    /// Create an empty store (root node only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Small tree with every value type, for demos
    pub fn demo() -> Self {
        let store = Self::new();
        let entries = [
            ("/", "version", Value::String("1.0".to_string())),
            ("/", "logLevel", Value::Byte(5)),
            ("/sensor/", "exposure", Value::Int(5000)),
            ("/sensor/", "autoExposure", Value::Bool(true)),
            ("/sensor/", "gain", Value::Float(1.5)),
            ("/camera/", "fps", Value::Short(30)),
            ("/camera/", "name", Value::String("cam0".to_string())),
            ("/camera/", "timestamp", Value::Long(0)),
            ("/camera/", "scale", Value::Double(0.25)),
            ("/camera/roi/", "x", Value::Int(0)),
            ("/camera/roi/", "y", Value::Int(0)),
        ];

        for (path, key, value) in entries {
            if let Err(e) = store.set(path, key, value) {
                tracing::warn!("Skipping demo entry {}{}: {}", path, key, e);
            }
        }
        store
    }

    /// Create a node and any missing ancestors
    pub fn create_node(&self, path: &str) -> Result<()> {
        let components = checked_components(path)?;
        let mut root = self.root.write();

        let mut node = &mut *root;
        for name in components {
            node = node.child_or_insert(name);
        }
        Ok(())
    }

    /// Create or replace the attribute `key` of the value's type
    ///
    /// Missing nodes along `path` are created.
    pub fn set(&self, path: &str, key: &str, value: Value) -> Result<()> {
        let components = checked_components(path)?;
        let mut root = self.root.write();

        let mut node = &mut *root;
        for name in components {
            node = node.child_or_insert(name);
        }

        match node.attribute_mut(key, value.value_type()) {
            Some(existing) => *existing = value,
            None => node.attributes.push((key.to_string(), value)),
        }
        Ok(())
    }

    pub fn node_exists(&self, path: &str) -> bool {
        let root = self.root.read();
        lookup(&root, path).is_some()
    }

    /// Current value of an attribute, if node and attribute exist
    pub fn value(&self, path: &str, key: &str, value_type: ValueType) -> Option<Value> {
        let root = self.root.read();
        lookup(&root, path)?.attribute(key, value_type).cloned()
    }

    /// Parse a seed entry of the form `NODE:KEY:TYPE=VALUE`
    ///
    /// Example: `/sensor/:exposure:int=5000`
    pub fn parse_seed(entry: &str) -> Result<(String, String, Value)> {
        let invalid = || ConfTreeError::Config(format!("expected NODE:KEY:TYPE=VALUE, got '{}'", entry));

        let (target, text) = entry.split_once('=').ok_or_else(invalid)?;
        let mut parts = target.rsplitn(3, ':');
        let type_name = parts.next().ok_or_else(invalid)?;
        let key = parts.next().ok_or_else(invalid)?;
        let path = parts.next().ok_or_else(invalid)?;

        let value_type = ValueType::from_name(type_name);
        if !value_type.is_known() {
            return Err(ConfTreeError::Config(format!("unknown type '{}'", type_name)));
        }

        let value = Value::parse(value_type, text)?;
        Ok((path.to_string(), key.to_string(), value))
    }

    // =========================================================================
    // Request Handling
    // =========================================================================

    /// Answer one protocol request
    pub fn handle(&self, request: &Request) -> Response {
        let path = request.node_path.as_deref().unwrap_or_default();
        let key = request.key.as_deref().unwrap_or_default();
        let value_type = request.value_type.unwrap_or(ValueType::Unknown);

        match request.action {
            Action::NodeExists => Response::boolean(Action::NodeExists, self.node_exists(path)),

            Action::AttrExists => {
                let root = self.root.read();
                match lookup(&root, path) {
                    Some(node) => Response::boolean(
                        Action::AttrExists,
                        node.attribute(key, value_type).is_some(),
                    ),
                    None => Response::error(NODE_MISSING),
                }
            }

            Action::Get => {
                let root = self.root.read();
                let Some(node) = lookup(&root, path) else {
                    return Response::error(NODE_MISSING);
                };
                match node.attribute(key, value_type) {
                    Some(value) => Response::new(Action::Get, value_type, value.to_string()),
                    None => Response::error(ATTR_MISSING),
                }
            }

            Action::Put => {
                let mut root = self.root.write();
                let Some(node) = lookup_mut(&mut root, path) else {
                    return Response::error(NODE_MISSING);
                };
                let Some(current) = node.attribute_mut(key, value_type) else {
                    return Response::error(ATTR_MISSING);
                };
                let text = request.value.as_deref().unwrap_or_default();
                match Value::parse(value_type, text) {
                    Ok(value) => {
                        tracing::debug!("PUT {}{} ({}) = {}", path, key, value_type, text);
                        *current = value;
                        Response::boolean(Action::Put, true)
                    }
                    Err(_) => Response::error("Impossible to convert value according to type."),
                }
            }

            Action::GetChildren => {
                let root = self.root.read();
                match lookup(&root, path) {
                    None => Response::error(NODE_MISSING),
                    Some(node) if node.children.is_empty() => Response::error("Node has no children."),
                    Some(node) => Response::listing(
                        Action::GetChildren,
                        node.children.iter().map(|(name, _)| name),
                    ),
                }
            }

            Action::GetAttributes => {
                let root = self.root.read();
                match lookup(&root, path) {
                    None => Response::error(NODE_MISSING),
                    Some(node) if node.attributes.is_empty() => {
                        Response::error("Node has no attributes.")
                    }
                    Some(node) => Response::listing(Action::GetAttributes, node.keys()),
                }
            }

            Action::GetTypes => {
                let root = self.root.read();
                let Some(node) = lookup(&root, path) else {
                    return Response::error(NODE_MISSING);
                };
                let types = node.types(key);
                if types.is_empty() {
                    return Response::error("Node has no attributes with specified key.");
                }
                Response::listing(
                    Action::GetTypes,
                    types.into_iter().filter_map(ValueType::name),
                )
            }

            Action::Error => Response::error(UNKNOWN_ACTION),
        }
    }
}

fn checked_components(path: &str) -> Result<Vec<&str>> {
    path_components(path).ok_or_else(|| ConfTreeError::Config(format!("invalid node path '{}'", path)))
}

fn lookup<'a>(root: &'a StoreNode, path: &str) -> Option<&'a StoreNode> {
    let mut node = root;
    for name in path_components(path)? {
        node = node.child(name)?;
    }
    Some(node)
}

fn lookup_mut<'a>(root: &'a mut StoreNode, path: &str) -> Option<&'a mut StoreNode> {
    let mut node = root;
    for name in path_components(path)? {
        node = node
            .children
            .iter_mut()
            .find(|(child, _)| child == name)
            .map(|(_, node)| node)?;
    }
    Some(node)
}
