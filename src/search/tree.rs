//! Recursive search over nested tree data.

use tracing::debug;

use crate::error::Result;
use crate::path::{Path, PathStep};
use crate::result::{sort_ascending, PathMatch};
use crate::search::generalize::find_similar_paths;
use crate::search::SearchTerms;
use crate::tree::{Scalar, TreeNode};
use crate::Options;

/// Depth-first searcher for [`TreeNode`] data.
///
/// A leaf scores `depth * (1 + extra * letter_deduction)`, where `extra` is
/// the number of normalized characters around the matched term. Leaves with
/// more than `max_extra_characters` around the term are dropped, and the best
/// term wins per leaf.
///
/// # Example
///
/// ```rust
/// use rs_page_analyzer::search::TreeSearcher;
/// use rs_page_analyzer::tree::TreeNode;
/// use rs_page_analyzer::Options;
///
/// let data = TreeNode::from(serde_json::json!({"item": {"its": "contents"}}));
/// let options = Options::default();
/// let found = TreeSearcher::new(&options).find(&data, &["contents"])?;
/// assert_eq!(found[0].path.to_string(), ".item.its");
/// # Ok::<(), rs_page_analyzer::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TreeSearcher<'o> {
    options: &'o Options,
}

impl<'o> TreeSearcher<'o> {
    #[must_use]
    pub fn new(options: &'o Options) -> Self {
        Self { options }
    }

    /// Find leaves of `data` matching any of `search_for`.
    ///
    /// Results are sorted ascending by score (best last) and carry the list
    /// alternatives found by [`find_similar_paths`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidQuery`] for an unusable query.
    pub fn find<S: AsRef<str>>(&self, data: &TreeNode, search_for: &[S]) -> Result<Vec<PathMatch>> {
        let terms = SearchTerms::new(search_for, self.options)?;
        Ok(self.find_terms(data, &terms))
    }

    /// Same as [`TreeSearcher::find`] with pre-normalized terms.
    #[must_use]
    pub fn find_terms(&self, data: &TreeNode, terms: &SearchTerms) -> Vec<PathMatch> {
        let mut found = Vec::new();
        self.search_node(data, &Path::default(), terms, &mut found);
        sort_ascending(&mut found, |m| m.score);
        debug!(matches = found.len(), "tree search finished");
        find_similar_paths(data, found)
    }

    fn search_node(&self, node: &TreeNode, path: &Path, terms: &SearchTerms, found: &mut Vec<PathMatch>) {
        match node {
            TreeNode::Scalar(Scalar::Null) => {}
            TreeNode::Scalar(scalar) => {
                let score = self.leaf_score(&scalar.to_string(), path.len(), terms);
                if score > 0.0 {
                    found.push(PathMatch {
                        path: path.clone(),
                        value: node.clone(),
                        score,
                        alternatives: Vec::new(),
                    });
                }
            }
            TreeNode::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.search_node(item, &path.child(PathStep::Index(i)), terms, found);
                }
            }
            TreeNode::Mapping(entries) => {
                for (key, value) in entries {
                    self.search_node(value, &path.child(PathStep::Field(key.clone())), terms, found);
                }
            }
        }
    }

    fn leaf_score(&self, text: &str, depth: usize, terms: &SearchTerms) -> f64 {
        let normalized = terms.normalize_text(text);
        let depth = depth as f64;
        terms.best_score(&normalized, |extra| {
            (extra <= self.options.max_extra_characters)
                .then(|| depth * (1.0 + extra as f64 * self.options.letter_deduction))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search(data: serde_json::Value, terms: &[&str]) -> Vec<PathMatch> {
        let options = Options::default();
        TreeSearcher::new(&options).find(&TreeNode::from(data), terms).unwrap()
    }

    #[test]
    fn finds_matching_leaf_only() {
        let found = search(json!({"item": {"its": "contents"}, "other": {"its": "other"}}), &["contents"]);
        let paths: Vec<String> = found.iter().map(|m| m.path.to_string()).collect();
        assert_eq!(paths, vec![".item.its"]);
    }

    #[test]
    fn deeper_leaf_scores_higher() {
        let found = search(json!({"name": "Dune", "book": {"meta": {"name": "Dune"}}}), &["dune"]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].path.to_string(), ".name");
        assert_eq!(found[1].path.to_string(), ".book.meta.name");
        assert!(found[1].score > found[0].score);
    }

    #[test]
    fn drops_leaves_with_too_much_surrounding_text() {
        let long = format!("price {} end", "x".repeat(60));
        let found = search(json!({"a": long, "b": "price 10"}), &["price"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path.to_string(), ".b");
    }

    #[test]
    fn skips_null_and_matches_numbers() {
        let found = search(json!({"rating": 8.5, "empty": null, "list": [null, "8.5/10"]}), &["8,5"]);
        let paths: Vec<String> = found.iter().map(|m| m.path.to_string()).collect();
        assert!(paths.contains(&".rating".to_string()));
        assert!(paths.contains(&".list[1]".to_string()));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn root_scalar_is_never_recorded() {
        let found = search(json!("contents"), &["contents"]);
        assert!(found.is_empty());
    }

    #[test]
    fn score_uses_best_term() {
        let found = search(json!({"a": "Blade Runner 2049"}), &["blade runner 2049", "2049"]);
        assert_eq!(found.len(), 1);
        // "2049" leaves 11 normalized characters around it
        assert!((found[0].score - 1.11).abs() < 1e-9);
    }
}
