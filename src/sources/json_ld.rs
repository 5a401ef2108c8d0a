//! JSON-LD block collection.
//!
//! Each `script[type="application/ld+json"]` is parsed on its own; blocks
//! that are empty or fail to parse become `null` so one broken block does not
//! hide the others and indexes still match script positions.

use dom_query::{Document, Selection};
use serde_json::Value;
use tracing::warn;

use crate::dom;
use crate::tree::{Scalar, TreeNode};

/// Selector for JSON-LD script blocks, shared with the generated crawler.
pub const JSON_LD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// Parse every JSON-LD block of `doc` into a sequence, in document order.
///
/// Index `N` is the `N`-th script block on the page; unusable blocks are `null`.
#[must_use]
pub fn parse_json_ld(doc: &Document) -> TreeNode {
    let mut blocks = Vec::new();

    for script in doc.select(JSON_LD_SELECTOR).nodes() {
        let script_sel = Selection::from(*script);
        let json_text = dom::text_content(&script_sel);
        let json_text = json_text.trim();

        if json_text.is_empty() {
            blocks.push(TreeNode::Scalar(Scalar::Null));
            continue;
        }

        match serde_json::from_str::<Value>(json_text) {
            Ok(data) => blocks.push(TreeNode::from(data)),
            Err(err) => {
                warn!(error = %err, block = blocks.len(), "skipping invalid JSON-LD block");
                blocks.push(TreeNode::Scalar(Scalar::Null));
            }
        }
    }

    TreeNode::Sequence(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_blocks() {
        let html = r#"<!DOCTYPE html>
        <html>
        <head>
            <script type="application/ld+json">
            {"@type": "Movie", "name": "Blade Runner 2049", "rating": "8.5"}
            </script>
            <script type="application/ld+json">
            {"@graph": [{"@type": "WebSite", "name": "Example Site"}]}
            </script>
        </head>
        <body></body>
        </html>"#;

        let data = parse_json_ld(&Document::from(html));
        let TreeNode::Sequence(blocks) = &data else {
            panic!("expected sequence");
        };
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].get("name").and_then(TreeNode::as_str), Some("Blade Runner 2049"));
    }

    #[test]
    fn unusable_blocks_keep_their_position() {
        let html = r#"<script type="application/ld+json">{ invalid json here }</script>
            <script type="application/ld+json"></script>
            <script type="application/ld+json">{"headline": "Valid Article"}</script>"#;

        let data = parse_json_ld(&Document::from(html));
        assert!(data.index(0).is_some_and(TreeNode::is_null));
        assert!(data.index(1).is_some_and(TreeNode::is_null));
        assert_eq!(
            data.index(2).and_then(|b| b.get("headline")).and_then(TreeNode::as_str),
            Some("Valid Article")
        );
        assert!(data.index(3).is_none());
    }
}
