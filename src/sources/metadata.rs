//! HTML meta tag collection.
//!
//! Every `<meta>` carrying a `name` (or, failing that, a `property`) and a
//! `content` becomes one entry of a flat mapping. Later tags with the same
//! name override earlier ones.

use dom_query::{Document, Selection};

use crate::dom;
use crate::tree::TreeNode;

/// Collect `<meta>` tags as a `name -> content` mapping.
#[must_use]
pub fn parse_metadata(doc: &Document) -> TreeNode {
    let mut result = TreeNode::empty_mapping();

    for node in doc.select("meta").nodes() {
        let meta = Selection::from(*node);

        let Some(name) = dom::get_attribute(&meta, "name")
            .or_else(|| dom::get_attribute(&meta, "property"))
            .filter(|name| !name.is_empty())
        else {
            continue;
        };
        let Some(content) = dom::get_attribute(&meta, "content") else {
            continue;
        };

        result.insert(name, TreeNode::string(content));
    }

    result
}
