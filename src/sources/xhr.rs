//! Captured network (XHR/fetch) responses.
//!
//! Only successful responses with a JSON-ish content type are searched.
//! Parsed JSON bodies go through the tree searcher; bodies that are still
//! text go through the DOM searcher.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::result::{PathMatch, SelectorMatch};
use crate::search::{DomSearcher, SearchTerms, TreeSearcher};
use crate::tree::TreeNode;
use crate::Options;

/// Content types whose bodies are worth searching.
const VALUABLE_CONTENT_TYPES: &[&str] = &["application/json", "application/ld+json"];

/// Responses with a status above this are ignored.
const MAX_SEARCHED_STATUS: u16 = 300;

fn default_method() -> String {
    "GET".to_string()
}

const fn default_status() -> u16 {
    200
}

/// One response captured while the page loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedResponse {
    #[serde(default = "default_method")]
    pub method: String,
    pub url: String,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Raw text, or an already parsed JSON value.
    #[serde(default)]
    pub body: Option<Value>,
}

/// A response body in searchable form.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody<'a> {
    Text(&'a str),
    Tree(TreeNode),
}

impl CapturedResponse {
    /// `METHOD url`, the label used in reports.
    #[must_use]
    pub fn request_label(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    fn has_valuable_content_type(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| VALUABLE_CONTENT_TYPES.iter().any(|valuable| ct.contains(valuable)))
    }

    /// The body to search, or `None` when the response is not worth searching.
    ///
    /// Text bodies of `application/json` responses are parsed; a body that
    /// fails to parse is searched as text.
    #[must_use]
    pub fn body_for_search(&self) -> Option<ResponseBody<'_>> {
        if self.status > MAX_SEARCHED_STATUS || !self.has_valuable_content_type() {
            return None;
        }
        match self.body.as_ref()? {
            Value::String(text) => {
                let is_json = self
                    .content_type
                    .as_deref()
                    .is_some_and(|ct| ct.starts_with("application/json"));
                if is_json {
                    match serde_json::from_str::<Value>(text) {
                        Ok(parsed) => return Some(ResponseBody::Tree(TreeNode::from(parsed))),
                        Err(err) => warn!(url = %self.url, error = %err, "response body is not valid JSON"),
                    }
                }
                Some(ResponseBody::Text(text))
            }
            Value::Null => None,
            other => Some(ResponseBody::Tree(TreeNode::from(other.clone()))),
        }
    }
}

/// Matches found in one response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseMatches {
    Tree(Vec<PathMatch>),
    Html(Vec<SelectorMatch>),
}

impl ResponseMatches {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseMatches::Tree(found) => found.is_empty(),
            ResponseMatches::Html(found) => found.is_empty(),
        }
    }
}

/// A response that contained at least one match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XhrMatch {
    pub request: String,
    pub search_results: ResponseMatches,
}

/// Search every searchable response body; keep the ones with matches.
#[must_use]
pub fn search_responses(responses: &[CapturedResponse], terms: &SearchTerms, options: &Options) -> Vec<XhrMatch> {
    let tree_searcher = TreeSearcher::new(options);
    let mut found = Vec::new();

    for response in responses {
        let Some(body) = response.body_for_search() else {
            continue;
        };
        let search_results = match body {
            ResponseBody::Tree(data) => ResponseMatches::Tree(tree_searcher.find_terms(&data, terms)),
            ResponseBody::Text(text) => match DomSearcher::from_html(text, options) {
                Ok(searcher) => ResponseMatches::Html(searcher.find_terms(terms)),
                Err(_) => continue,
            },
        };
        if search_results.is_empty() {
            continue;
        }
        debug!(request = %response.request_label(), "response body matched");
        found.push(XhrMatch {
            request: response.request_label(),
            search_results,
        });
    }

    found
}
