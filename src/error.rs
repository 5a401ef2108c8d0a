//! Error types for rs-page-analyzer.
//!
//! Only caller programming errors surface here. Data conditions met while
//! searching (missing nodes, non-unique selectors, list elements that do not
//! share a shape) are handled where they occur and never reach the caller.

/// Error type for search, generalization and crawler generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The DOM searcher was built without a parsed document or HTML source.
    #[error("DOM searcher requires a parsed document or HTML code")]
    MissingDocument,

    /// The search query is unusable (empty list or a term that normalizes to nothing).
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    /// A path step could not be resolved against the searched tree.
    #[error("Path resolution failed: {0}")]
    PathResolution(String),

    /// A JSON document handed to the analyzer could not be decoded.
    #[error("JSON parsing failed: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The analyzer input document is structurally valid JSON but unusable.
    #[error("Invalid analyzer input: {0}")]
    InvalidInput(String),

    /// The page URL could not be parsed.
    #[error("Invalid page URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for analyzer operations.
pub type Result<T> = std::result::Result<T, Error>;
