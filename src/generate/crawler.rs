//! Runnable crawler definition wrapping a generated program.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::generate::program::ExtractionProgram;

/// Request hook installed in every generated crawler; keeps default behavior.
pub const DEFAULT_INTERCEPT_REQUEST: &str = "function interceptRequest(context, newRequest) {\n    // called whenever the crawler finds a link to a new page,\n    // use it to override default behavior\n    return newRequest;\n}\n";

/// Cookie handling of generated crawlers.
pub const COOKIES_PERSISTENCE: &str = "PER_PROCESS";

/// A start URL entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartUrl {
    pub key: String,
    pub value: String,
}

/// Crawler settings around one page function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerDefinition {
    pub clickable_elements_selector: Option<String>,
    pub page_function: String,
    pub intercept_request: String,
    pub load_images: bool,
    pub load_css: bool,
    #[serde(rename = "injectJQuery")]
    pub inject_jquery: bool,
    pub ignore_robots_txt: bool,
    pub cookies_persistence: String,
    pub custom_id: String,
    pub comments: Option<String>,
    pub start_urls: Vec<StartUrl>,
}

impl CrawlerDefinition {
    /// Definition crawling `url` with `program`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] when `url` does not parse or has no host.
    pub fn new(url: &str, program: &ExtractionProgram) -> Result<Self> {
        Ok(Self {
            clickable_elements_selector: None,
            page_function: program.page_function(),
            intercept_request: DEFAULT_INTERCEPT_REQUEST.to_string(),
            load_images: false,
            load_css: false,
            inject_jquery: program.requires_selector_engine,
            ignore_robots_txt: false,
            cookies_persistence: COOKIES_PERSISTENCE.to_string(),
            custom_id: custom_id(url)?,
            comments: None,
            start_urls: vec![StartUrl {
                key: String::new(),
                value: url.to_string(),
            }],
        })
    }
}

/// Host name with its first dot replaced by `-` (`www.example.com` -> `www-example.com`).
fn custom_id(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(format!("{url}: no host")))?;
    Ok(host.replacen('.', "-", 1))
}
