//! Cross-source ranking and crawler generation.
//!
//! Every match from every source competes for every requested field. A
//! candidate must contain the field's search string (ignoring case) and is
//! scored as
//!
//! ```text
//! (source coefficient - extra characters * letter coefficient) * case coefficient
//! ```
//!
//! where the case coefficient is `1.0` for a case-exact match and the
//! incorrect-case coefficient otherwise. The best candidate per field
//! becomes one [`FieldStatement`] of the generated [`ExtractionProgram`].

pub mod crawler;
pub mod program;

use serde::Serialize;
use tracing::debug;

use crate::normalize::normalize;
use crate::options::RankWeights;
use crate::path::{Path, PathStep};
use crate::query::SearchQuery;
use crate::result::{PathMatch, SelectorMatch};

pub use crawler::CrawlerDefinition;
pub use program::{ExtractionProgram, FieldStatement, Lookup};

/// Source a ranked candidate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceType {
    #[serde(rename = "metadata")]
    Metadata,
    #[serde(rename = "schemaOrg")]
    Microdata,
    #[serde(rename = "jsonLD")]
    JsonLd,
    #[serde(rename = "window")]
    Window,
    #[serde(rename = "html")]
    Html,
}

impl SourceType {
    #[must_use]
    pub fn coefficient(self, weights: &RankWeights) -> f64 {
        match self {
            SourceType::Metadata => weights.metadata,
            SourceType::Microdata => weights.microdata,
            SourceType::JsonLd => weights.json_ld,
            SourceType::Window => weights.window,
            SourceType::Html => weights.html,
        }
    }
}

/// Location of a candidate within its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Locator {
    Path(Path),
    Selector(String),
}

/// Generalized search results of one page, per source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub metadata: Vec<PathMatch>,
    pub microdata: Vec<PathMatch>,
    pub json_ld: Vec<PathMatch>,
    pub window: Vec<PathMatch>,
    pub html: Vec<SelectorMatch>,
}

impl SearchResults {
    fn flatten(&self) -> Vec<(SourceType, Locator, String)> {
        let tree_sources = [
            (SourceType::Metadata, &self.metadata),
            (SourceType::Microdata, &self.microdata),
            (SourceType::JsonLd, &self.json_ld),
            (SourceType::Window, &self.window),
        ];
        let mut flat: Vec<_> = tree_sources
            .into_iter()
            .flat_map(|(source, found)| {
                found
                    .iter()
                    .map(move |m| (source, Locator::Path(m.path.clone()), m.value_text()))
            })
            .collect();
        flat.extend(
            self.html
                .iter()
                .map(|m| (SourceType::Html, Locator::Selector(m.selector.clone()), m.text.clone())),
        );
        flat
    }
}

/// One source value competing for a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub source_type: SourceType,
    pub locator: Locator,
    pub raw_value: String,
    /// Normalized, lowercased value.
    pub normalized_value: String,
    pub case_exact: bool,
    pub score: f64,
}

/// Candidates for one field, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCandidates {
    pub field: String,
    pub candidates: Vec<RankedCandidate>,
}

impl FieldCandidates {
    #[must_use]
    pub fn winner(&self) -> Option<&RankedCandidate> {
        self.candidates.first()
    }
}

/// Ranks search results across sources and generates extraction programs.
///
/// Stateless; every call is a pure function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlerGenerator {
    weights: RankWeights,
}

impl CrawlerGenerator {
    #[must_use]
    pub fn new(weights: RankWeights) -> Self {
        Self { weights }
    }

    /// Rank every candidate for every field of `query`, in field order.
    #[must_use]
    pub fn rank(&self, results: &SearchResults, query: &SearchQuery) -> Vec<FieldCandidates> {
        let flat = results.flatten();
        query
            .fields()
            .iter()
            .map(|(field, search)| {
                let candidates = self.rank_field(&flat, search);
                debug!(%field, candidates = candidates.len(), "ranked field candidates");
                FieldCandidates {
                    field: field.clone(),
                    candidates,
                }
            })
            .collect()
    }

    fn rank_field(&self, flat: &[(SourceType, Locator, String)], search: &str) -> Vec<RankedCandidate> {
        let search_exact = normalize(search);
        let search_lower = search_exact.to_lowercase();
        let search_len = search_lower.chars().count();

        let mut candidates: Vec<RankedCandidate> = flat
            .iter()
            .filter_map(|(source_type, locator, raw_value)| {
                let value_exact = normalize(raw_value);
                let normalized_value = value_exact.to_lowercase();
                if !normalized_value.contains(&search_lower) {
                    return None;
                }
                let case_exact = value_exact.contains(&search_exact);
                let extra = normalized_value.chars().count().saturating_sub(search_len);
                let deduction = extra as f64 * self.weights.letter_coefficient;
                let case_coefficient = if case_exact {
                    1.0
                } else {
                    self.weights.incorrect_case_coefficient
                };
                Some(RankedCandidate {
                    source_type: *source_type,
                    locator: locator.clone(),
                    raw_value: raw_value.clone(),
                    normalized_value,
                    case_exact,
                    score: (source_type.coefficient(&self.weights) - deduction) * case_coefficient,
                })
            })
            .collect();

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    /// Program reading each field from its winning candidate.
    #[must_use]
    pub fn program(&self, ranked: &[FieldCandidates]) -> ExtractionProgram {
        ExtractionProgram::new(
            ranked
                .iter()
                .map(|field| FieldStatement {
                    field: field.field.clone(),
                    lookup: field.winner().map_or(Lookup::Empty, lookup_for),
                })
                .collect(),
        )
    }

    /// Rank and generate in one step.
    #[must_use]
    pub fn generate(&self, results: &SearchResults, query: &SearchQuery) -> ExtractionProgram {
        self.program(&self.rank(results, query))
    }
}

fn lookup_for(candidate: &RankedCandidate) -> Lookup {
    match (candidate.source_type, &candidate.locator) {
        (SourceType::Metadata, Locator::Path(path)) => path
            .first_field()
            .map_or(Lookup::Empty, |name| Lookup::Meta { name: name.to_string() }),
        (SourceType::Microdata, Locator::Path(path)) => Lookup::Microdata { path: path.clone() },
        (SourceType::JsonLd, Locator::Path(path)) => match path.steps().split_first() {
            Some((PathStep::Index(block), rest)) => Lookup::JsonLd {
                block: *block,
                path: Path::new(rest.to_vec()),
            },
            _ => Lookup::Empty,
        },
        (SourceType::Window, Locator::Path(path)) => Lookup::Window { path: path.clone() },
        (SourceType::Html, Locator::Selector(selector)) => Lookup::Html {
            selector: selector.clone(),
        },
        _ => Lookup::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;

    fn path_match(path: &str, value: &str) -> PathMatch {
        PathMatch {
            path: path.parse().unwrap(),
            value: TreeNode::string(value),
            score: 1.0,
            alternatives: Vec::new(),
        }
    }

    fn selector_match(selector: &str, text: &str) -> SelectorMatch {
        SelectorMatch {
            selector: selector.into(),
            text: text.into(),
            score: 1.0,
            alternatives: Vec::new(),
        }
    }

    #[test]
    fn metadata_beats_dom_text() {
        let results = SearchResults {
            metadata: vec![path_match(".og:title", "Blade Runner 2049")],
            html: vec![selector_match("h1", "Blade Runner 2049")],
            ..SearchResults::default()
        };
        let query = SearchQuery::from_fields([("title", "Blade Runner 2049")]);
        let ranked = CrawlerGenerator::default().rank(&results, &query);
        let candidates = &ranked[0].candidates;
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].source_type, SourceType::Metadata);
        assert!(candidates[0].score > candidates[1].score);
        assert!((candidates[0].score - 1.0).abs() < 1e-9);
        assert!((candidates[1].score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn case_and_length_penalties() {
        let results = SearchResults {
            json_ld: vec![
                path_match("[0].name", "blade runner"),
                path_match("[0].headline", "Blade Runner review"),
            ],
            ..SearchResults::default()
        };
        let query = SearchQuery::from_fields([("title", "Blade Runner")]);
        let ranked = CrawlerGenerator::default().rank(&results, &query);
        let candidates = &ranked[0].candidates;
        // 0.9 * 0.9 for the lowercase one, 0.9 - 6 * 0.01 for the longer one
        assert!(!candidates[1].case_exact);
        assert!((candidates[1].score - 0.81).abs() < 1e-9);
        assert!(candidates[0].case_exact);
        assert!((candidates[0].score - 0.84).abs() < 1e-9);
        assert_eq!(candidates[0].normalized_value, "bladerunnerreview");
    }

    #[test]
    fn unmatched_field_is_empty() {
        let results = SearchResults {
            html: vec![selector_match("h1", "Something else")],
            ..SearchResults::default()
        };
        let query = SearchQuery::from_fields([("price", "10 USD")]);
        let program = CrawlerGenerator::default().generate(&results, &query);
        assert_eq!(program.field_statements[0].lookup, Lookup::Empty);
        assert!(!program.requires_selector_engine);
    }

    #[test]
    fn json_ld_lookup_splits_block_index() {
        let results = SearchResults {
            json_ld: vec![path_match("[1].offers.price", "10")],
            ..SearchResults::default()
        };
        let query = SearchQuery::from_fields([("price", "10")]);
        let program = CrawlerGenerator::default().generate(&results, &query);
        assert_eq!(
            program.field_statements[0].lookup,
            Lookup::JsonLd {
                block: 1,
                path: ".offers.price".parse().unwrap()
            }
        );
        assert!(program.requires_selector_engine);
    }

    #[test]
    fn window_lookup_needs_no_selector_engine() {
        let results = SearchResults {
            window: vec![path_match(".__DATA__.title", "Blade Runner")],
            ..SearchResults::default()
        };
        let query = SearchQuery::from_fields([("title", "Blade Runner")]);
        let program = CrawlerGenerator::default().generate(&results, &query);
        assert!(matches!(program.field_statements[0].lookup, Lookup::Window { .. }));
        assert!(!program.requires_selector_engine);
    }
}
