//! HTML document access
//!
//! Helpers over the `dom_query` crate shared by the DOM searcher and the
//! page source parsers, so both read attributes, text and children the same way.

pub use dom_query::{Document, NodeRef, Selection};

/// Elements whose text is never rendered on the page.
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

// === Attributes ===

/// Trimmed `id` attribute; blank ids count as absent.
#[must_use]
pub fn id(sel: &Selection) -> Option<String> {
    non_blank_attribute(sel, "id")
}

/// Class tokens of the `class` attribute, in source order.
#[must_use]
pub fn class_list(sel: &Selection) -> Vec<String> {
    sel.attr("class")
        .map(|classes| classes.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Raw attribute value.
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|value| value.to_string())
}

/// Trimmed attribute value, `None` when missing or blank.
#[must_use]
pub fn non_blank_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[inline]
#[must_use]
pub fn has_attribute(sel: &Selection, name: &str) -> bool {
    sel.has_attr(name)
}

// === Elements ===

/// Lowercase tag name of the first selected node.
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    let node = sel.nodes().first()?;
    node.node_name().map(|name| name.to_ascii_lowercase())
}

/// Whether the element's text is hidden from readers (scripts, styles, templates).
#[must_use]
pub fn is_non_rendered(sel: &Selection) -> bool {
    tag_name(sel).is_some_and(|tag| NON_RENDERED_TAGS.contains(&tag.as_str()))
}

/// Element children of the first selected node, each as its own selection.
#[must_use]
pub fn element_children<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    sel.children().nodes().iter().map(|node| Selection::from(*node)).collect()
}

// === Text ===

/// Every descendant text node, script and style bodies included.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> String {
    sel.text().to_string()
}

/// Text a reader would see: descendant text without script/style/template content.
#[must_use]
pub fn rendered_text(sel: &Selection) -> String {
    let mut out = String::new();
    if let Some(node) = sel.nodes().first() {
        push_rendered_text(node, &mut out);
    }
    out
}

fn push_rendered_text(node: &NodeRef, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(&child.text());
        } else if child.is_element() && !is_non_rendered(&Selection::from(child)) {
            push_rendered_text(&child, out);
        }
    }
}

// === Documents ===

#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Elements matching a CSS selector.
#[inline]
#[must_use]
pub fn query_selector_all<'a>(doc: &'a Document, selector: &str) -> Selection<'a> {
    doc.select(selector)
}

/// Number of elements matching `selector` (0 for invalid selectors).
#[must_use]
pub fn count(doc: &Document, selector: &str) -> usize {
    doc.select(selector).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_text_skips_scripts() {
        let doc = parse("<div id='x'>Price <script>var p = 10;</script><b>10</b><style>b{}</style></div>");
        let div = doc.select("#x");
        assert_eq!(rendered_text(&div), "Price 10");
        assert!(text_content(&div).contains("var p"));
    }

    #[test]
    fn element_children_skip_text_nodes() {
        let doc = parse("<ol>text<li>a</li> <li>b</li></ol>");
        let items = element_children(&doc.select("ol"));
        assert_eq!(items.len(), 2);
        assert_eq!(tag_name(&items[1]).as_deref(), Some("li"));
    }

    #[test]
    fn blank_id_is_ignored() {
        let doc = parse("<p id=' '>a</p><p id='main'>b</p>");
        let ids: Vec<Option<String>> = element_children(&doc.select("body")).iter().map(id).collect();
        assert_eq!(ids, vec![None, Some("main".to_string())]);
    }

    #[test]
    fn splits_class_tokens() {
        let doc = parse("<p class=' price  big '>1</p><p>2</p>");
        let paragraphs = element_children(&doc.select("body"));
        assert_eq!(class_list(&paragraphs[0]), vec!["price", "big"]);
        assert!(class_list(&paragraphs[1]).is_empty());
    }

    #[test]
    fn counts_matches() {
        let doc = parse("<p class='a'>1</p><p class='a'>2</p>");
        assert_eq!(count(&doc, "p.a"), 2);
        assert_eq!(count(&doc, "p.b"), 0);
    }
}
