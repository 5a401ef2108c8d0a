//! Page-defined global (window) state.
//!
//! A blank page's global property names form the native baseline. The
//! baseline is computed once per browser session by the caller and passed
//! into each analysis; only properties outside it are searched.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tree::{Scalar, TreeNode};

/// Global property names present on a blank page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeProperties(HashSet<String>);

impl NativeProperties {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for NativeProperties {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Keep the page-defined part of a window snapshot.
///
/// Drops native names, window-like objects (both `document` and `location`
/// present) and unimportant values (`null`, `""`, `true`, `false`). Nested
/// unimportant values are dropped from objects and nulled inside arrays so
/// array indexes stay stable.
#[must_use]
pub fn window_properties(snapshot: &Map<String, Value>, native: &NativeProperties) -> TreeNode {
    let mut result = TreeNode::empty_mapping();
    for (name, value) in snapshot {
        if native.contains(name) || is_unimportant(value) || is_window_like(value) {
            continue;
        }
        result.insert(name.clone(), prune(value));
    }
    result
}

fn is_unimportant(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(_) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_window_like(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.contains_key("document") && map.contains_key("location"))
}

fn prune(value: &Value) -> TreeNode {
    match value {
        Value::Object(map) => TreeNode::Mapping(
            map.iter()
                .filter(|(_, v)| !is_unimportant(v))
                .map(|(k, v)| (k.clone(), prune(v)))
                .collect(),
        ),
        Value::Array(items) => TreeNode::Sequence(
            items
                .iter()
                .map(|v| if is_unimportant(v) { TreeNode::Scalar(Scalar::Null) } else { prune(v) })
                .collect(),
        ),
        other => TreeNode::from(other.clone()),
    }
}
