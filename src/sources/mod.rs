//! Page data sources.
//!
//! Each source turns one part of a page into a [`crate::tree::TreeNode`]
//! (or, for XHR, searches captured bodies directly):
//!
//! - [`metadata`] - `<meta>` tags
//! - [`json_ld`] - `application/ld+json` blocks
//! - [`microdata`] - schema.org `itemscope`/`itemprop` markup
//! - [`window`] - page-defined global state
//! - [`xhr`] - captured network responses

pub mod json_ld;
pub mod metadata;
pub mod microdata;
pub mod window;
pub mod xhr;

pub use json_ld::parse_json_ld;
pub use metadata::parse_metadata;
pub use microdata::parse_microdata;
pub use window::{window_properties, NativeProperties};
pub use xhr::{search_responses, CapturedResponse, XhrMatch};
