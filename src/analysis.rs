//! Page analysis pipeline.
//!
//! Each enabled source is parsed and searched in turn with explicit calls;
//! the per-source results are then ranked across sources and compiled into
//! a crawler definition. Sources that cannot run (no HTML, no window
//! snapshot) are skipped and noted in the report's warnings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::dom::Document;
use crate::encoding::decode_html;
use crate::error::{Error, Result};
use crate::generate::{CrawlerDefinition, CrawlerGenerator, FieldCandidates, SearchResults};
use crate::options::{Options, Source};
use crate::query::SearchQuery;
use crate::result::{PathMatch, SelectorMatch};
use crate::search::generalize::common_ancestors;
use crate::search::{DomSearcher, SearchTerms, TreeSearcher};
use crate::sources::{
    parse_json_ld, parse_metadata, parse_microdata, search_responses, window_properties, CapturedResponse,
    NativeProperties, XhrMatch,
};
use crate::tree::TreeNode;

/// Everything captured for one page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    /// Page URL; `http://` is assumed when no scheme is given.
    pub url: String,

    /// Fully rendered HTML.
    #[serde(default)]
    pub html: String,

    /// Snapshot of the page's global properties.
    #[serde(default)]
    pub window_properties: Option<Map<String, Value>>,

    /// Global property names of a blank page in the same browser session.
    #[serde(default)]
    pub native_window_properties: NativeProperties,

    /// Responses captured while the page loaded.
    #[serde(default)]
    pub xhr_requests: Vec<CapturedResponse>,

    /// What to look for.
    pub search_for: SearchQuery,

    /// Sources to search for this page; overrides the input-wide list.
    #[serde(default)]
    pub tests: Option<Vec<Source>>,
}

impl PageInput {
    /// `options` with this page's source selection applied.
    #[must_use]
    pub fn effective_options(&self, options: &Options) -> Options {
        match &self.tests {
            Some(tests) => Options {
                sources: tests.clone(),
                ..options.clone()
            },
            None => options.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Batch {
        pages: Vec<PageInput>,
        #[serde(default)]
        tests: Option<Vec<Source>>,
    },
    Single(PageInput),
}

/// An analyzer input document: several pages, or a single page object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzerInput {
    pub pages: Vec<PageInput>,
    /// Sources searched on pages that do not choose their own.
    pub tests: Option<Vec<Source>>,
}

impl AnalyzerInput {
    /// Parse and validate an input document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonParse`] for malformed JSON, [`Error::InvalidInput`]
    /// when there are no pages and [`Error::InvalidQuery`] for a page with an
    /// empty `searchFor`.
    pub fn from_json(json: &str) -> Result<Self> {
        let input = match serde_json::from_str::<RawInput>(json)? {
            RawInput::Batch { pages, tests } => Self { pages, tests },
            RawInput::Single(page) => Self {
                pages: vec![page],
                tests: None,
            },
        };
        input.validate()?;
        Ok(input)
    }

    fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(Error::InvalidInput("input must contain at least one page".into()));
        }
        if let Some(page) = self.pages.iter().find(|page| page.search_for.is_empty()) {
            return Err(Error::InvalidQuery(format!("page '{}' has an empty searchFor", page.url)));
        }
        Ok(())
    }

    /// `options` with the input-wide source selection applied.
    #[must_use]
    pub fn effective_options(&self, options: &Options) -> Options {
        match &self.tests {
            Some(tests) => Options {
                sources: tests.clone(),
                ..options.clone()
            },
            None => options.clone(),
        }
    }

    /// Analyze every page in order.
    #[must_use]
    pub fn analyze(&self, options: &Options) -> Vec<Result<AnalysisReport>> {
        let options = self.effective_options(options);
        self.pages.iter().map(|page| analyze_page(page, &options)).collect()
    }
}

/// Outcome of analyzing one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub url: String,
    pub analysis_started: DateTime<Utc>,
    pub analysis_ended: DateTime<Utc>,

    pub meta_data: TreeNode,
    pub meta_data_found: Vec<PathMatch>,

    #[serde(rename = "allJsonLDData")]
    pub all_json_ld_data: TreeNode,
    #[serde(rename = "jsonLDData")]
    pub json_ld_data: TreeNode,
    #[serde(rename = "jsonLDDataFound")]
    pub json_ld_data_found: Vec<PathMatch>,

    pub all_schema_org_data: TreeNode,
    pub schema_org_data: TreeNode,
    pub schema_org_data_found: Vec<PathMatch>,

    pub all_window_properties: TreeNode,
    pub window_properties: TreeNode,
    pub window_properties_found: Vec<PathMatch>,

    pub html_found: Vec<SelectorMatch>,
    pub xhr_requests_found: Vec<XhrMatch>,

    /// Candidates per requested field, best first.
    pub ranked: Vec<FieldCandidates>,
    pub crawler: CrawlerDefinition,

    /// Sources that could not be searched, and fields nothing was found for.
    pub warnings: Vec<String>,
}

/// Parsed data, found matches and common ancestors of one tree source.
struct TreeSourceOutcome {
    all: TreeNode,
    found: Vec<PathMatch>,
    ancestors: TreeNode,
}

impl TreeSourceOutcome {
    fn skipped(all: TreeNode) -> Self {
        Self {
            ancestors: all.clone(),
            all,
            found: Vec::new(),
        }
    }

    fn search(all: TreeNode, searcher: &TreeSearcher<'_>, terms: &SearchTerms) -> Self {
        let found = searcher.find_terms(&all, terms);
        let ancestors = common_ancestors(&all, &found);
        Self { all, found, ancestors }
    }
}

/// Prefix `http://` to scheme-less URLs and check the result parses.
fn full_url(url: &str) -> Result<String> {
    let url = url.trim();
    let has_scheme = url
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http://"))
        || url.get(..8).is_some_and(|prefix| prefix.eq_ignore_ascii_case("https://"));
    let full = if has_scheme {
        url.to_string()
    } else {
        format!("http://{url}")
    };
    Url::parse(&full).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
    Ok(full)
}

/// Search every enabled source of `page` and generate its crawler.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] for an unusable page URL and
/// [`Error::InvalidQuery`] for an unusable `searchFor`.
pub fn analyze_page(page: &PageInput, options: &Options) -> Result<AnalysisReport> {
    let analysis_started = Utc::now();
    let url = full_url(&page.url)?;
    let options = page.effective_options(options);
    let terms = SearchTerms::new(&page.search_for.terms(), &options)?;
    info!(%url, sources = ?options.sources, "analyzing page");

    let mut warnings = Vec::new();
    let tree_searcher = TreeSearcher::new(&options);
    let document = Document::from(page.html.as_str());

    let metadata = if options.is_enabled(Source::Meta) {
        TreeSourceOutcome::search(parse_metadata(&document), &tree_searcher, &terms)
    } else {
        TreeSourceOutcome::skipped(TreeNode::empty_mapping())
    };
    debug!(found = metadata.found.len(), "metadata searched");

    let json_ld = if options.is_enabled(Source::JsonLd) {
        TreeSourceOutcome::search(parse_json_ld(&document), &tree_searcher, &terms)
    } else {
        TreeSourceOutcome::skipped(TreeNode::Sequence(Vec::new()))
    };
    debug!(found = json_ld.found.len(), "JSON-LD searched");

    let microdata = if options.is_enabled(Source::Microdata) {
        TreeSourceOutcome::search(parse_microdata(&document), &tree_searcher, &terms)
    } else {
        TreeSourceOutcome::skipped(TreeNode::Sequence(Vec::new()))
    };
    debug!(found = microdata.found.len(), "microdata searched");

    let window = match (&page.window_properties, options.is_enabled(Source::Window)) {
        (Some(snapshot), true) => TreeSourceOutcome::search(
            window_properties(snapshot, &page.native_window_properties),
            &tree_searcher,
            &terms,
        ),
        (None, true) => {
            warn!(%url, "no window snapshot captured");
            warnings.push("Window properties were not captured".to_string());
            TreeSourceOutcome::skipped(TreeNode::empty_mapping())
        }
        (_, false) => TreeSourceOutcome::skipped(TreeNode::empty_mapping()),
    };
    debug!(found = window.found.len(), "window properties searched");

    let html_found = match (options.is_enabled(Source::Html), page.html.trim().is_empty()) {
        (true, false) => DomSearcher::from_document(document, &options).find_terms(&terms),
        (true, true) => {
            warn!(%url, "page HTML is empty");
            warnings.push("HTML is empty, DOM was not searched".to_string());
            Vec::new()
        }
        (false, _) => Vec::new(),
    };
    debug!(found = html_found.len(), "HTML searched");

    let xhr_requests_found = if options.is_enabled(Source::Xhr) {
        search_responses(&page.xhr_requests, &terms, &options)
    } else {
        Vec::new()
    };
    debug!(found = xhr_requests_found.len(), "XHR responses searched");

    let results = SearchResults {
        metadata: metadata.found,
        microdata: microdata.found,
        json_ld: json_ld.found,
        window: window.found,
        html: html_found,
    };
    let generator = CrawlerGenerator::new(options.rank);
    let ranked = generator.rank(&results, &page.search_for);
    for field in ranked.iter().filter(|field| field.candidates.is_empty()) {
        warnings.push(format!("No value found for field '{}'", field.field));
    }
    let crawler = CrawlerDefinition::new(&url, &generator.program(&ranked))?;

    let analysis_ended = Utc::now();
    info!(%url, warnings = warnings.len(), "analysis finished");

    Ok(AnalysisReport {
        url,
        analysis_started,
        analysis_ended,
        meta_data: metadata.all,
        meta_data_found: results.metadata,
        all_json_ld_data: json_ld.all,
        json_ld_data: json_ld.ancestors,
        json_ld_data_found: results.json_ld,
        all_schema_org_data: microdata.all,
        schema_org_data: microdata.ancestors,
        schema_org_data_found: results.microdata,
        all_window_properties: window.all,
        window_properties: window.ancestors,
        window_properties_found: results.window,
        html_found: results.html,
        xhr_requests_found,
        ranked,
        crawler,
        warnings,
    })
}

/// [`analyze_page`] for HTML still in its served bytes.
///
/// `content_type` is the response's `Content-Type` header, if known.
///
/// # Errors
///
/// Same as [`analyze_page`].
pub fn analyze_page_bytes(
    mut page: PageInput,
    html: &[u8],
    content_type: Option<&str>,
    options: &Options,
) -> Result<AnalysisReport> {
    page.html = decode_html(html, content_type);
    analyze_page(&page, options)
}
