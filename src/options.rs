//! Configuration options for page analysis.
//!
//! The `Options` struct controls scoring constants, which page sources are
//! searched, and the cross-source ranking coefficients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Data source on an analysed page.
///
/// Serialized with the labels used in analyzer input files
/// (`"SCHEMA.ORG"`, `"JSON-LD"`, `"WINDOW"`, `"XHR"`, `"META"`, `"HTML"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Schema.org microdata (`itemscope`/`itemprop`).
    #[serde(rename = "SCHEMA.ORG")]
    Microdata,
    /// `application/ld+json` script blocks.
    #[serde(rename = "JSON-LD")]
    JsonLd,
    /// Non-native global window properties.
    #[serde(rename = "WINDOW")]
    Window,
    /// Captured XHR/fetch response bodies.
    #[serde(rename = "XHR")]
    Xhr,
    /// `<meta name|property=... content=...>` tags.
    #[serde(rename = "META")]
    Meta,
    /// Visible DOM text.
    #[serde(rename = "HTML")]
    Html,
}

impl Source {
    /// Every source, in the order the analyzer runs them.
    pub const ALL: [Source; 6] = [
        Source::Meta,
        Source::JsonLd,
        Source::Microdata,
        Source::Html,
        Source::Window,
        Source::Xhr,
    ];

    /// Input-file label for this source.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Source::Microdata => "SCHEMA.ORG",
            Source::JsonLd => "JSON-LD",
            Source::Window => "WINDOW",
            Source::Xhr => "XHR",
            Source::Meta => "META",
            Source::Html => "HTML",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|source| source.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown source '{s}'"))
    }
}

/// Per-source priors and penalties used when ranking candidates across sources.
///
/// Structured, author-curated sources are trusted over scraped DOM text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankWeights {
    /// Coefficient for `<meta>` tag candidates.
    ///
    /// Default: `1.0`
    pub metadata: f64,

    /// Coefficient for schema.org microdata candidates.
    ///
    /// Default: `0.95`
    pub microdata: f64,

    /// Coefficient for JSON-LD candidates.
    ///
    /// Default: `0.9`
    pub json_ld: f64,

    /// Coefficient for window state candidates.
    ///
    /// Default: `0.9`
    pub window: f64,

    /// Coefficient for DOM text candidates.
    ///
    /// Default: `0.8`
    pub html: f64,

    /// Deduction per character of the candidate beyond the searched string.
    ///
    /// Default: `0.01`
    pub letter_coefficient: f64,

    /// Multiplier applied when the candidate only matches case-insensitively.
    ///
    /// Default: `0.9`
    pub incorrect_case_coefficient: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            metadata: 1.0,
            microdata: 0.95,
            json_ld: 0.9,
            window: 0.9,
            html: 0.8,
            letter_coefficient: 0.01,
            incorrect_case_coefficient: 0.9,
        }
    }
}

/// Configuration options for page analysis.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_page_analyzer::{Options, Source};
///
/// let options = Options {
///     sources: vec![Source::Meta, Source::JsonLd],
///     ..Options::default()
/// };
/// assert!(options.is_enabled(Source::Meta));
/// assert!(!options.is_enabled(Source::Html));
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Per-character factor applied to text surrounding a match.
    ///
    /// Default: `0.01`
    pub letter_deduction: f64,

    /// Leaves with more surrounding characters than this are not recorded.
    ///
    /// Only applies to tree sources; DOM elements carry whole subtrees of text.
    ///
    /// Default: `40`
    pub max_extra_characters: usize,

    /// Score bonus per step of a synthesized CSS selector.
    ///
    /// Default: `0.2`
    pub selector_step_bonus: f64,

    /// Compare normalized text and search terms lowercased.
    ///
    /// Default: `true`
    pub case_insensitive: bool,

    /// Drop grid-column and zebra-striping classes before building selectors.
    ///
    /// Default: `true`
    pub strip_unstable_classes: bool,

    /// Sources searched by [`crate::analyze_page`].
    ///
    /// Default: every [`Source`]
    pub sources: Vec<Source>,

    /// Cross-source ranking coefficients.
    pub rank: RankWeights,
}

impl Options {
    /// Whether `source` is searched during page analysis.
    #[must_use]
    pub fn is_enabled(&self, source: Source) -> bool {
        self.sources.contains(&source)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            letter_deduction: 0.01,
            max_extra_characters: 40,
            selector_step_bonus: 0.2,
            case_insensitive: true,
            strip_unstable_classes: true,
            sources: Source::ALL.to_vec(),
            rank: RankWeights::default(),
        }
    }
}
