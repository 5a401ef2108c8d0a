//! Schema.org microdata collection.
//!
//! Top-level `[itemscope]` elements become `{ _type, ...props }` mappings.
//! A property belongs to the closest enclosing item scope only, nested
//! scopes recurse, and a property repeated within one scope becomes a
//! sequence.

use dom_query::{Document, NodeRef, Selection};

use crate::dom;
use crate::tree::{Scalar, TreeNode};

/// Key holding the `itemtype` of a scope.
pub const TYPE_KEY: &str = "_type";

/// Key holding the scope's own value when it declares no properties.
pub const VALUE_KEY: &str = "_value";

/// Parse every top-level item scope of `doc`, in document order.
#[must_use]
pub fn parse_microdata(doc: &Document) -> TreeNode {
    let items = doc
        .select("[itemscope]")
        .nodes()
        .iter()
        .filter(|node| nearest_item_scope(**node).is_none())
        .map(|node| extract_item_scope(*node))
        .collect();
    TreeNode::Sequence(items)
}

fn extract_item_scope(scope: NodeRef<'_>) -> TreeNode {
    let scope_sel = Selection::from(scope);
    let mut item = TreeNode::empty_mapping();
    if let Some(item_type) = dom::get_attribute(&scope_sel, "itemtype") {
        item.insert(TYPE_KEY, TreeNode::string(item_type));
    }

    let mut count = 0;
    for prop in scope_sel.select("[itemprop]").nodes() {
        if nearest_item_scope(*prop).map(|owner| owner.id) != Some(scope.id) {
            continue;
        }
        let prop_sel = Selection::from(*prop);
        let value = if dom::has_attribute(&prop_sel, "itemscope") {
            extract_item_scope(*prop)
        } else {
            extract_value(&prop_sel)
        };
        let name = dom::get_attribute(&prop_sel, "itemprop").unwrap_or_default();
        push_property(&mut item, name, value);
        count += 1;
    }

    if count == 0 {
        item.insert(VALUE_KEY, extract_value(&scope_sel));
    }
    item
}

/// `content` attribute, then text, then `src`, then `href`; first non-empty wins.
fn extract_value(sel: &Selection) -> TreeNode {
    let value = dom::get_attribute(sel, "content")
        .filter(|v| !v.is_empty())
        .or_else(|| Some(dom::text_content(sel)).filter(|v| !v.is_empty()))
        .or_else(|| dom::get_attribute(sel, "src").filter(|v| !v.is_empty()))
        .or_else(|| dom::get_attribute(sel, "href").filter(|v| !v.is_empty()));

    match value {
        Some(value) => TreeNode::string(value.trim()),
        None => TreeNode::Scalar(Scalar::Null),
    }
}

fn push_property(item: &mut TreeNode, name: String, value: TreeNode) {
    let TreeNode::Mapping(entries) = item else {
        return;
    };
    match entries.iter_mut().find(|(key, _)| *key == name) {
        Some((_, TreeNode::Sequence(values))) => values.push(value),
        Some((_, existing)) => {
            let first = std::mem::replace(existing, TreeNode::Sequence(Vec::new()));
            *existing = TreeNode::Sequence(vec![first, value]);
        }
        None => entries.push((name, value)),
    }
}

/// Closest ancestor (excluding `node` itself) carrying `itemscope`.
fn nearest_item_scope(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if ancestor.is_element() && Selection::from(ancestor).has_attr("itemscope") {
            return Some(ancestor);
        }
        current = ancestor.parent();
    }
    None
}
