//! Result types for search output.
//!
//! These records are serialized as-is into the diagnostic part of an
//! analysis report.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::path::Path;
use crate::tree::TreeNode;

/// Same relative lookup succeeding at several positions of one list.
///
/// `container` addresses the list (array path or CSS selector of the repeated
/// elements), `item` the lookup relative to each element, and
/// `index_to_value` what the lookup yields at every position where it resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlternative<V> {
    pub container: String,
    pub item: String,
    pub index_to_value: BTreeMap<usize, V>,
}

/// A value found in a tree source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathMatch {
    /// Location of the value from the searched tree root.
    pub path: Path,

    /// The matched leaf, as it appears in the source.
    pub value: TreeNode,

    /// Search score; higher is better.
    pub score: f64,

    /// Lists the match sits in, most specific first.
    #[serde(rename = "foundInLists", skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<ListAlternative<TreeNode>>,
}

impl PathMatch {
    /// The value as text, the way it is compared with search strings.
    #[must_use]
    pub fn value_text(&self) -> String {
        match &self.value {
            TreeNode::Scalar(scalar) => scalar.to_string(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}

/// An element found in an HTML document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectorMatch {
    /// CSS selector locating the element.
    pub selector: String,

    /// Rendered text of the element.
    pub text: String,

    /// Search score; higher is better.
    pub score: f64,

    /// Repeated structures the element sits in, most specific first.
    #[serde(rename = "foundInLists", skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<ListAlternative<String>>,
}

/// Sort matches ascending by score, keeping discovery order between equal scores.
///
/// The best match ends up last.
pub(crate) fn sort_ascending<T>(items: &mut [T], score: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| score(a).total_cmp(&score(b)));
}
