//! Tagged tree model for searched page data.
//!
//! Metadata, JSON-LD, microdata, window state and XHR bodies are all
//! converted once into [`TreeNode`] so traversal matches on the variant
//! instead of probing runtime types.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Leaf value of a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

/// A node of searched data: scalar, ordered sequence, or mapping.
///
/// Mappings keep insertion order and unique keys.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Scalar(Scalar),
    Sequence(Vec<TreeNode>),
    Mapping(Vec<(String, TreeNode)>),
}

impl TreeNode {
    /// Shorthand for a string leaf.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        TreeNode::Scalar(Scalar::String(value.into()))
    }

    /// Shorthand for an empty mapping.
    #[must_use]
    pub fn empty_mapping() -> Self {
        TreeNode::Mapping(Vec::new())
    }

    /// Look up a mapping entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        match self {
            TreeNode::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a sequence element by index.
    #[must_use]
    pub fn index(&self, index: usize) -> Option<&TreeNode> {
        match self {
            TreeNode::Sequence(items) => items.get(index),
            _ => None,
        }
    }

    /// Insert or replace a mapping entry, keeping the original position on replace.
    ///
    /// Does nothing on non-mapping nodes.
    pub fn insert(&mut self, key: impl Into<String>, value: TreeNode) {
        if let TreeNode::Mapping(entries) = self {
            let key = key.into();
            if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value;
            } else {
                entries.push((key, value));
            }
        }
    }

    /// The scalar stored in this node, if it is a leaf.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            TreeNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The string stored in this node, if it is a string leaf.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Whether this is a null leaf.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, TreeNode::Scalar(Scalar::Null))
    }
}

impl From<Value> for TreeNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TreeNode::Scalar(Scalar::Null),
            Value::Bool(b) => TreeNode::Scalar(Scalar::Bool(b)),
            Value::Number(n) => TreeNode::Scalar(Scalar::Number(n)),
            Value::String(s) => TreeNode::Scalar(Scalar::String(s)),
            Value::Array(items) => TreeNode::Sequence(items.into_iter().map(TreeNode::from).collect()),
            Value::Object(map) => {
                TreeNode::Mapping(map.into_iter().map(|(k, v)| (k, TreeNode::from(v))).collect())
            }
        }
    }
}

impl From<&str> for TreeNode {
    fn from(value: &str) -> Self {
        TreeNode::string(value)
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeNode::Scalar(scalar) => scalar.serialize(serializer),
            TreeNode::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            TreeNode::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
