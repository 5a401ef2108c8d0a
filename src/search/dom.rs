//! Search over a parsed HTML document with CSS selector synthesis.
//!
//! The search runs in two passes. Tagging walks the element tree from
//! `<body>` and keeps, for every element whose text contains a search term,
//! either its matching children or (when no child matches on its own) the
//! element itself as a leaf. Selector synthesis then turns the ancestor chain
//! of every leaf into the shortest unique CSS selector it can find.

use serde::Serialize;
use tracing::{debug, trace};

use crate::dom::{self, Document, Selection};
use crate::error::{Error, Result};
use crate::patterns::{CSS_IDENTIFIER, UNSTABLE_CLASS};
use crate::result::{sort_ascending, SelectorMatch};
use crate::search::generalize::{find_similar_selectors, SELECTOR_STEP_SEPARATOR};
use crate::search::SearchTerms;
use crate::Options;

/// Compact summary of one element, enough to rebuild a selector step.
///
/// Holds no reference into the document, so selectors can be rebuilt after
/// the document is parsed again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    pub tag: String,
    pub id: Option<String>,
    /// Class tokens usable in a selector, templating classes removed.
    pub class_list: Vec<String>,
    /// Position among element siblings.
    pub child_index: usize,
    /// Position among element siblings with the same tag.
    pub type_index: usize,
    pub text_score: Option<f64>,
}

/// Outcome of tagging one element.
#[derive(Debug, Clone)]
struct TaggedElement {
    descriptor: ElementDescriptor,
    /// Set when the element itself is a match.
    text: Option<String>,
    /// Set when at least one child matches; holds every child for indexing.
    children: Option<Vec<TaggedElement>>,
}

impl TaggedElement {
    fn unmatched(descriptor: ElementDescriptor) -> Self {
        Self {
            descriptor,
            text: None,
            children: None,
        }
    }

    fn is_viable(&self) -> bool {
        self.text.is_some() || self.children.is_some()
    }
}

/// Fuzzy searcher for an HTML document.
///
/// # Example
///
/// ```rust
/// use rs_page_analyzer::search::DomSearcher;
/// use rs_page_analyzer::Options;
///
/// let options = Options::default();
/// let searcher = DomSearcher::from_html(
///     r#"<body><div id="product"><h1>Blade Runner</h1><span class="price">8,50</span></div></body>"#,
///     &options,
/// )?;
/// let found = searcher.find(&["8.50"])?;
/// assert_eq!(found.last().map(|m| m.selector.as_str()), Some(".price"));
/// # Ok::<(), rs_page_analyzer::Error>(())
/// ```
pub struct DomSearcher<'o> {
    document: Document,
    options: &'o Options,
}

impl<'o> DomSearcher<'o> {
    /// Build a searcher from whichever of a parsed document or HTML source is at hand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDocument`] when neither is given, or the HTML is blank.
    pub fn new(document: Option<Document>, html: Option<&str>, options: &'o Options) -> Result<Self> {
        match (document, html) {
            (Some(document), _) => Ok(Self::from_document(document, options)),
            (None, Some(html)) => Self::from_html(html, options),
            (None, None) => Err(Error::MissingDocument),
        }
    }

    /// Search an already parsed document.
    #[must_use]
    pub fn from_document(document: Document, options: &'o Options) -> Self {
        Self { document, options }
    }

    /// Parse `html` and search it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDocument`] for blank HTML.
    pub fn from_html(html: &str, options: &'o Options) -> Result<Self> {
        if html.trim().is_empty() {
            return Err(Error::MissingDocument);
        }
        Ok(Self::from_document(dom::parse(html), options))
    }

    /// Replace the searched document by a new parse of `html`.
    pub fn set_html(&mut self, html: &str) {
        self.document = dom::parse(html);
    }

    /// The searched document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Find elements whose text matches any of `search_for`.
    ///
    /// Results are sorted ascending by score (best last).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] for an unusable query.
    pub fn find<S: AsRef<str>>(&self, search_for: &[S]) -> Result<Vec<SelectorMatch>> {
        let terms = SearchTerms::new(search_for, self.options)?;
        Ok(self.find_terms(&terms))
    }

    /// Same as [`DomSearcher::find`] with pre-normalized terms.
    #[must_use]
    pub fn find_terms(&self, terms: &SearchTerms) -> Vec<SelectorMatch> {
        let body = self.document.select("body");
        let roots = if body.exists() {
            dom::element_children(&body)
        } else {
            dom::element_children(&Selection::from(self.document.root()))
        };

        let mut found = Vec::new();
        for tagged in self.tag_siblings(&roots, terms) {
            if tagged.is_viable() {
                self.collect_matches(&[], &tagged, &mut found);
            }
        }

        sort_ascending(&mut found, |m| m.score);
        debug!(matches = found.len(), "DOM search finished");
        find_similar_selectors(&self.document, found)
    }

    // === Tagging ===

    fn tag_siblings(&self, siblings: &[Selection], terms: &SearchTerms) -> Vec<TaggedElement> {
        let mut seen_tags: Vec<String> = Vec::new();
        siblings
            .iter()
            .enumerate()
            .map(|(child_index, sel)| {
                let tag = dom::tag_name(sel).unwrap_or_default();
                let type_index = seen_tags.iter().filter(|t| **t == tag).count();
                seen_tags.push(tag.clone());
                self.tag_element(sel, tag, child_index, type_index, terms)
            })
            .collect()
    }

    fn tag_element(
        &self,
        sel: &Selection,
        tag: String,
        child_index: usize,
        type_index: usize,
        terms: &SearchTerms,
    ) -> TaggedElement {
        let descriptor = ElementDescriptor {
            tag,
            id: dom::id(sel),
            class_list: self.selector_classes(sel),
            child_index,
            type_index,
            text_score: None,
        };
        if dom::is_non_rendered(sel) {
            return TaggedElement::unmatched(descriptor);
        }

        let text = dom::rendered_text(sel);
        let normalized = terms.normalize_text(&text);
        let letter_deduction = self.options.letter_deduction;
        let score = terms.best_score(&normalized, |extra| Some(1.0 + extra as f64 * letter_deduction));
        if score <= 0.0 {
            return TaggedElement::unmatched(descriptor);
        }
        let descriptor = ElementDescriptor {
            text_score: Some(score),
            ..descriptor
        };

        let children = dom::element_children(sel);
        if !children.is_empty() {
            let tagged_children = self.tag_siblings(&children, terms);
            if tagged_children.iter().any(TaggedElement::is_viable) {
                return TaggedElement {
                    descriptor,
                    text: None,
                    children: Some(tagged_children),
                };
            }
        }
        TaggedElement {
            descriptor,
            text: Some(text.trim().to_string()),
            children: None,
        }
    }

    fn selector_classes(&self, sel: &Selection) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        for class in dom::class_list(sel) {
            let unstable = self.options.strip_unstable_classes && UNSTABLE_CLASS.is_match(&class);
            if CSS_IDENTIFIER.is_match(&class) && !unstable && !classes.contains(&class) {
                classes.push(class);
            }
        }
        classes
    }

    // === Selector synthesis ===

    fn collect_matches(&self, ancestors: &[ElementDescriptor], item: &TaggedElement, found: &mut Vec<SelectorMatch>) {
        let mut chain = ancestors.to_vec();
        chain.push(item.descriptor.clone());

        if let Some(text) = &item.text {
            let selector = self.create_selector(&chain);
            let steps = selector.split(SELECTOR_STEP_SEPARATOR).count() as f64;
            let text_score = item.descriptor.text_score.unwrap_or_default();
            found.push(SelectorMatch {
                score: (1.0 + steps * self.options.selector_step_bonus) * text_score,
                selector,
                text: text.clone(),
                alternatives: Vec::new(),
            });
            return;
        }

        for child in item.children.iter().flatten() {
            if child.is_viable() {
                self.collect_matches(&chain, child, found);
            }
        }
    }

    /// Shortest unique selector for the last element of `chain`.
    ///
    /// The chain is cut at the closest ancestor with a document-unique id,
    /// then steps are prepended from the leaf upwards until the selector
    /// matches a single element or the chain runs out.
    fn create_selector(&self, chain: &[ElementDescriptor]) -> String {
        let anchor = chain
            .iter()
            .rposition(|step| step.id.as_deref().is_some_and(|id| self.is_unique(&id_selector(id))))
            .unwrap_or(0);

        let mut parts: Vec<String> = chain[anchor..].iter().map(|step| self.step_selector(step)).collect();
        let mut selector = parts.pop().unwrap_or_default();
        while dom::count(&self.document, &selector) > 1 {
            let Some(parent) = parts.pop() else {
                trace!(%selector, "selector stays ambiguous after exhausting ancestors");
                break;
            };
            selector = format!("{parent}{SELECTOR_STEP_SEPARATOR}{selector}");
            trace!(%selector, "prepended ancestor step");
        }
        selector
    }

    /// Selector for a single step: unique id, unique classes, unique tag, or position.
    fn step_selector(&self, step: &ElementDescriptor) -> String {
        if let Some(id) = &step.id {
            let by_id = id_selector(id);
            if self.is_unique(&by_id) {
                return by_id;
            }
        }
        if !step.class_list.is_empty() {
            let classes: String = step.class_list.iter().map(|c| format!(".{c}")).collect();
            if self.is_unique(&classes) {
                return classes;
            }
            let tagged = format!("{}{classes}", step.tag);
            if self.is_unique(&tagged) {
                return tagged;
            }
        }
        if self.is_unique(&step.tag) {
            return step.tag.clone();
        }
        format!("{}:nth-of-type({})", step.tag, step.type_index + 1)
    }

    fn is_unique(&self, selector: &str) -> bool {
        dom::count(&self.document, selector) == 1
    }
}

/// `#id`, or an attribute selector for ids that are not plain CSS identifiers.
fn id_selector(id: &str) -> String {
    if CSS_IDENTIFIER.is_match(id) {
        format!("#{id}")
    } else {
        format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
