//! Tree Discovery Module
//!
//! Builds a complete in-memory mirror of the remote configuration tree.
//!
//! ## Request Order (per node)
//! 1. GET_ATTRIBUTES
//! 2. GET_TYPES for each key
//! 3. GET for each (key, type)
//! 4. GET_CHILDREN, then each child in server order, depth first
//!
//! A node with `A` keys advertising `T` types in total costs `2 + A + T`
//! round trips. Children are independent and could be fetched in parallel
//! over separate connections, but that would change the order in which the
//! server sees requests, so the walk stays serial.

use serde::Serialize;

use crate::client::Client;
use crate::error::{ConfTreeError, Result};
use crate::protocol::{path_components, ValueType};
use crate::transport::DuplexStream;

/// Path of the tree root
pub const ROOT_PATH: &str = "/";

/// One typed value found on a node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub key: String,

    #[serde(rename = "type")]
    pub value_type: ValueType,

    /// Value as sent by the server
    pub value: String,
}

/// A discovered node and everything below it
///
/// Attributes and children keep the server's order. Duplicate names are
/// kept as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigNode {
    /// Last path component (empty for the root)
    pub name: String,

    /// Absolute, slash-terminated path
    pub path: String,

    pub attributes: Vec<Attribute>,

    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    fn new(name: &str, path: String) -> Self {
        Self {
            name: name.to_string(),
            path,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// First attribute with the given key
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.key == key)
    }

    /// Attribute with the given key and type
    pub fn attribute_of_type(&self, key: &str, value_type: ValueType) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key && attr.value_type == value_type)
    }

    /// Find a descendant by absolute path (`/a/b/`)
    pub fn find(&self, path: &str) -> Option<&ConfigNode> {
        let relative = path.strip_prefix(self.path.as_str())?;

        let mut node = self;
        for name in relative.split('/').filter(|name| !name.is_empty()) {
            node = node.child(name)?;
        }
        Some(node)
    }

    /// Total number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ConfigNode::node_count).sum::<usize>()
    }

    /// Depth-first, pre-order iteration over this subtree
    pub fn iter(&self) -> impl Iterator<Item = &ConfigNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Child path: parent path + name + "/"
pub fn child_path(parent: &str, name: &str) -> String {
    let mut path = String::with_capacity(parent.len() + name.len() + 1);
    path.push_str(parent);
    path.push_str(name);
    path.push('/');
    path
}

/// Canonical form of a node path given by a caller
pub fn node_path(path: &str) -> Result<String> {
    let mut canonical = path.to_string();
    if !canonical.ends_with('/') {
        canonical.push('/');
    }

    match path_components(&canonical) {
        Some(_) if !path.is_empty() => Ok(canonical),
        _ => Err(ConfTreeError::Protocol(format!("invalid node path '{}'", path))),
    }
}

/// Walk the whole tree from the root
pub fn discover<S: DuplexStream>(client: &mut Client<S>) -> Result<ConfigNode> {
    discover_from(client, ROOT_PATH)
}

/// A node whose children are still being visited
struct Frame {
    node: ConfigNode,
    pending: std::vec::IntoIter<String>,
}

/// Walk the subtree below `root_path`
///
/// Uses an explicit stack instead of recursion; requests go out in the
/// same order a recursive walk would send them. Any error aborts the pass
/// and the partially built tree is dropped.
///
/// A missing trailing slash is added (`/camera` walks `/camera/`). Paths
/// that are not absolute or contain empty components fail before any
/// request is sent.
pub fn discover_from<S: DuplexStream>(client: &mut Client<S>, root_path: &str) -> Result<ConfigNode> {
    let root_path = node_path(root_path)?;
    let root_path = root_path.as_str();
    let started_at = client.round_trips();
    let root_name = root_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    let mut root = visit(client, root_name, root_path.to_string())?;
    let mut stack: Vec<Frame> = Vec::new();
    let mut visited = 1usize;

    loop {
        let top = stack.last_mut().unwrap_or(&mut root);

        match top.pending.next() {
            Some(name) => {
                let path = child_path(&top.node.path, &name);
                stack.push(visit(client, &name, path)?);
                visited += 1;
            }
            None => match stack.pop() {
                // Child finished, attach it to its parent
                Some(done) => stack
                    .last_mut()
                    .unwrap_or(&mut root)
                    .node
                    .children
                    .push(done.node),
                None => break,
            },
        }
    }

    tracing::debug!(
        "Discovered {} nodes under {} in {} round trips",
        visited,
        root_path,
        client.round_trips() - started_at
    );

    Ok(root.node)
}

/// Resolve one node's attributes and list its children
fn visit<S: DuplexStream>(client: &mut Client<S>, name: &str, path: String) -> Result<Frame> {
    let mut node = ConfigNode::new(name, path);

    for key in client.attributes(&node.path)? {
        for type_name in client.types(&node.path, &key)? {
            let value_type = ValueType::from_name(&type_name);
            if !value_type.is_known() {
                tracing::warn!(
                    "Skipping {}{}: unknown type '{}'",
                    node.path,
                    key,
                    type_name
                );
                continue;
            }

            if let Some(value) = client.get(&node.path, &key, value_type)? {
                node.attributes.push(Attribute {
                    key: key.clone(),
                    value_type,
                    value,
                });
            }
        }
    }

    let children = client.children(&node.path)?;
    tracing::trace!(
        "Visited {}: {} attributes, {} children",
        node.path,
        node.attributes.len(),
        children.len()
    );

    Ok(Frame {
        node,
        pending: children.into_iter(),
    })
}
