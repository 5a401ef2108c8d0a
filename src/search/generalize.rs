//! Detection of matches that sit inside repeated structures.
//!
//! A match found at `[0].offers[2].price` probably has siblings at
//! `[0].offers[*].price`; an element found at `li:nth-of-type(3) > span`
//! probably has siblings under every other `li`. These functions record the
//! positions where the same relative lookup also succeeds so a consumer can
//! pick a different item later.
//!
//! Resolution failures while probing are expected (most siblings do not
//! share the exact shape) and only exclude that sibling.

use std::collections::BTreeMap;

use dom_query::{Document, NodeRef, Selection};
use tracing::trace;

use crate::path::{resolve_steps, Path, PathStep};
use crate::patterns::NTH_OF_TYPE;
use crate::result::{ListAlternative, PathMatch, SelectorMatch};
use crate::tree::TreeNode;

/// Separator between steps of synthesized selectors.
pub const SELECTOR_STEP_SEPARATOR: &str = " > ";

/// Attach list alternatives to every tree match.
///
/// Each index step of a match path splits it into a container path (up to
/// the array) and an item path (after the index). When the item path
/// resolves under at least two array elements, the split is recorded.
/// Alternatives are ordered innermost array first.
#[must_use]
pub fn find_similar_paths(data: &TreeNode, matches: Vec<PathMatch>) -> Vec<PathMatch> {
    matches
        .into_iter()
        .map(|mut found| {
            found.alternatives = path_alternatives(data, &found.path);
            found
        })
        .collect()
}

fn path_alternatives(data: &TreeNode, path: &Path) -> Vec<ListAlternative<TreeNode>> {
    let steps = path.steps();
    let mut alternatives: Vec<_> = steps
        .iter()
        .enumerate()
        .filter(|(_, step)| matches!(step, PathStep::Index(_)))
        .filter_map(|(i, _)| {
            let container_steps = &steps[..i];
            let item_steps = &steps[i + 1..];
            let Ok(TreeNode::Sequence(items)) = resolve_steps(data, container_steps) else {
                return None;
            };
            let index_to_value: BTreeMap<usize, TreeNode> = items
                .iter()
                .enumerate()
                .filter_map(|(j, item)| resolve_steps(item, item_steps).ok().map(|v| (j, v.clone())))
                .collect();
            (index_to_value.len() > 1).then(|| ListAlternative {
                container: Path::new(container_steps.to_vec()).to_string(),
                item: Path::new(item_steps.to_vec()).to_string(),
                index_to_value,
            })
        })
        .collect();
    alternatives.reverse();
    alternatives
}

/// Attach list alternatives to every selector match.
///
/// The selector is cut at each step boundary; the prefix, with any
/// positional pseudo-class dropped from its last step, is queried as the
/// container and the remaining steps are resolved as a child chain under
/// each container element. Containers where at least two elements resolve
/// are recorded, innermost first.
#[must_use]
pub fn find_similar_selectors(doc: &Document, matches: Vec<SelectorMatch>) -> Vec<SelectorMatch> {
    matches
        .into_iter()
        .map(|mut found| {
            found.alternatives = selector_alternatives(doc, &found.selector);
            found
        })
        .collect()
}

fn selector_alternatives(doc: &Document, selector: &str) -> Vec<ListAlternative<String>> {
    let steps: Vec<&str> = selector.split(SELECTOR_STEP_SEPARATOR).collect();
    let mut alternatives = Vec::new();

    for i in 0..steps.len() {
        let mut container_steps: Vec<String> = steps[..=i].iter().map(ToString::to_string).collect();
        container_steps[i] = NTH_OF_TYPE.replace(steps[i], "").into_owned();
        let container = container_steps.join(SELECTOR_STEP_SEPARATOR);
        let item_steps = &steps[i + 1..];

        let index_to_value: BTreeMap<usize, String> = doc
            .select(&container)
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(j, node)| resolve_child_chain(*node, item_steps).map(|text| (j, text)))
            .collect();

        trace!(%container, resolved = index_to_value.len(), "probed selector container");
        if index_to_value.len() > 1 {
            alternatives.push(ListAlternative {
                container,
                item: item_steps.join(SELECTOR_STEP_SEPARATOR),
                index_to_value,
            });
        }
    }

    alternatives.reverse();
    alternatives
}

/// Follow `steps` as a `parent > child` chain below `node`; text of the first hit.
fn resolve_child_chain(node: NodeRef<'_>, steps: &[&str]) -> Option<String> {
    let mut current = vec![node];
    for step in steps {
        current = current
            .into_iter()
            .flat_map(|parent| Selection::from(parent).children().nodes().to_vec())
            .filter(|child| Selection::from(*child).is(step))
            .collect();
        if current.is_empty() {
            return None;
        }
    }
    current.first().map(|found| Selection::from(*found).text().to_string())
}

/// The top-level entries of `data` that found matches descend through.
///
/// Returns a mapping keyed by property name, or by stringified index for
/// sequences, in first-touched order.
#[must_use]
pub fn common_ancestors(data: &TreeNode, matches: &[PathMatch]) -> TreeNode {
    let mut ancestors = TreeNode::empty_mapping();
    for found in matches {
        let Some(first) = found.path.steps().first() else {
            continue;
        };
        let (key, value) = match first {
            PathStep::Field(name) => (name.clone(), data.get(name)),
            PathStep::Index(i) => (i.to_string(), data.index(*i)),
        };
        if ancestors.get(&key).is_none() {
            if let Some(value) = value {
                ancestors.insert(key, value.clone());
            }
        }
    }
    ancestors
}
