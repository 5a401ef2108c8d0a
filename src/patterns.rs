//! Compiled regex patterns used by the normalizer and selector synthesis.
//!
//! All patterns are compiled once at first use via `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Text Normalization
// =============================================================================

/// Matches an HTML tag, including one left unterminated at the end of the text.
pub static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>?").expect("HTML_TAG regex"));

// =============================================================================
// Selector Synthesis
// =============================================================================

/// Matches class tokens that come from layout templating rather than meaning:
/// responsive grid columns (`col-md-6`, `col-xs-12`, `col-4`) and
/// zebra-striping (`even`, `odd`, `row-even`, `item--odd`).
pub static UNSTABLE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(col-([a-z]+-)?\d+|([\w-]*[-_])?(even|odd))$").expect("UNSTABLE_CLASS regex")
});

/// Matches identifiers usable verbatim after `#` or `.` in a CSS selector.
pub static CSS_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[A-Za-z_][A-Za-z0-9_-]*$").expect("CSS_IDENTIFIER regex"));

/// Matches the positional pseudo-class appended to a selector step.
pub static NTH_OF_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":nth-of-type\(\d+\)$").expect("NTH_OF_TYPE regex"));

// =============================================================================
// Charset Detection
// =============================================================================

/// Matches `<meta charset=...>` and the charset inside
/// `<meta http-equiv="Content-Type" content="...; charset=...">`.
pub static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+?charset\s*=\s*["']?([^"';\s>]+)"#).expect("META_CHARSET regex")
});

/// Matches the `charset` parameter of a `Content-Type` value.
pub static CONTENT_TYPE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i);\s*charset\s*=\s*["']?([^"';\s]+)"#).expect("CONTENT_TYPE_CHARSET regex")
});

// =============================================================================
// Program Generation
// =============================================================================

/// Matches property names usable after `.` in a JavaScript member expression.
pub static JS_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("JS_IDENTIFIER regex"));
