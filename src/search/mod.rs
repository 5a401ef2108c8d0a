//! Fuzzy search over page sources.
//!
//! Two searchers share one scoring model: [`tree::TreeSearcher`] walks nested
//! data (metadata, JSON-LD, microdata, window state, XHR bodies) and
//! [`dom::DomSearcher`] walks an HTML document. Both return matches sorted
//! ascending by score and annotated by [`generalize`] with the list
//! structures they sit in.

pub mod dom;
pub mod generalize;
pub mod tree;

use crate::error::{Error, Result};
use crate::normalize::normalize_for_search;
use crate::Options;

pub use dom::{DomSearcher, ElementDescriptor};
pub use tree::TreeSearcher;

/// Search strings normalized once for a whole search pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerms {
    normalized: Vec<String>,
    case_insensitive: bool,
}

impl SearchTerms {
    /// Normalize `terms` for searching.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] when `terms` is empty or a term
    /// normalizes to the empty string, which would match every node.
    pub fn new<S: AsRef<str>>(terms: &[S], options: &Options) -> Result<Self> {
        if terms.is_empty() {
            return Err(Error::InvalidQuery("search requires at least one search string".into()));
        }
        let normalized = terms
            .iter()
            .map(|term| {
                let normalized = normalize_for_search(term.as_ref(), options.case_insensitive);
                if normalized.is_empty() {
                    Err(Error::InvalidQuery(format!(
                        "search string '{}' is empty after normalization",
                        term.as_ref()
                    )))
                } else {
                    Ok(normalized)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            normalized,
            case_insensitive: options.case_insensitive,
        })
    }

    /// The normalized search strings.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.normalized
    }

    /// Normalize candidate text the same way the terms were normalized.
    #[must_use]
    pub fn normalize_text(&self, text: &str) -> String {
        normalize_for_search(text, self.case_insensitive)
    }

    /// Best score of `normalized_text` over all terms.
    ///
    /// `score_extra` maps the number of characters surrounding a term
    /// occurrence to a score, or `None` to reject that occurrence. Returns
    /// `0.0` when no term is contained.
    pub(crate) fn best_score(&self, normalized_text: &str, score_extra: impl Fn(usize) -> Option<f64>) -> f64 {
        let text_len = normalized_text.chars().count();
        self.normalized
            .iter()
            .filter(|term| normalized_text.contains(term.as_str()))
            .filter_map(|term| score_extra(text_len - term.chars().count()))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_queries() {
        let options = Options::default();
        let empty: [&str; 0] = [];
        assert!(matches!(SearchTerms::new(&empty, &options), Err(Error::InvalidQuery(_))));
        assert!(matches!(SearchTerms::new(&["  \n"], &options), Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn best_score_takes_maximum_over_terms() {
        let terms = SearchTerms::new(&["Runner", "Blade Runner"], &Options::default()).unwrap();
        let text = terms.normalize_text("Blade Runner 2049");
        let score = terms.best_score(&text, |extra| Some(extra as f64));
        // "runner" leaves 9 surrounding characters, "bladerunner" leaves 4
        assert!((score - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn best_score_is_zero_without_match() {
        let terms = SearchTerms::new(&["missing"], &Options::default()).unwrap();
        assert!(terms.best_score("something", |_| Some(1.0)).abs() < f64::EPSILON);
    }
}
