//! # rs-page-analyzer
//!
//! Finds where known values live on a web page and generates a crawler that
//! re-extracts them from similar pages.
//!
//! A page is searched in every structured source it offers (meta tags,
//! JSON-LD, schema.org microdata, page-defined window state, captured XHR
//! responses) and in its visible DOM text. Each match gets a score, a stable
//! path or CSS selector, and the list positions where the same lookup also
//! succeeds. Matches then compete across sources per requested field and the
//! winners become a small extraction program.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_page_analyzer::{analyze_page, Options, PageInput, SearchQuery};
//!
//! let page = PageInput {
//!     url: "https://www.example.com/movie".into(),
//!     html: r#"<html><head><meta property="og:title" content="Blade Runner 2049"></head>
//!         <body><h1>Blade Runner 2049</h1></body></html>"#.into(),
//!     search_for: SearchQuery::from_fields([("title", "Blade Runner 2049")]),
//!     ..PageInput::default()
//! };
//!
//! let report = analyze_page(&page, &Options::default())?;
//! assert_eq!(report.html_found[0].selector, "h1");
//! assert!(report.crawler.page_function.contains("og:title"));
//! # Ok::<(), rs_page_analyzer::Error>(())
//! ```
//!
//! ## Components
//!
//! - [`normalize`]: text canonicalization shared by every scorer
//! - [`search`]: tree and DOM searchers plus list generalization
//! - [`sources`]: page data sources turned into searchable trees
//! - [`generate`]: cross-source ranking and crawler generation

mod analysis;
mod error;
mod options;
mod patterns;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Byte decoding with charset detection.
pub mod encoding;

/// Cross-source ranking, extraction programs and crawler definitions.
pub mod generate;

/// Text normalization for comparisons.
pub mod normalize;

/// Paths addressing values inside trees.
pub mod path;

/// Search queries.
pub mod query;

/// Search result records.
pub mod result;

/// Tree and DOM searchers.
pub mod search;

/// Page data sources.
pub mod sources;

/// Tagged tree data model.
pub mod tree;

// Public API - re-exports
pub use analysis::{analyze_page, analyze_page_bytes, AnalysisReport, AnalyzerInput, PageInput};
pub use error::{Error, Result};
pub use options::{Options, RankWeights, Source};
pub use query::SearchQuery;
pub use result::{ListAlternative, PathMatch, SelectorMatch};
