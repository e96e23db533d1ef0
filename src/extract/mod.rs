//! Content extraction: plain text, markdown, metadata, and links
//!
//! This module defines only the extraction contract the execution engine
//! relies on; rendering fidelity is deliberately simple. The crawl worker
//! consumes `links`, clients consume the rest.

mod html;
mod markdown;

pub use html::{extract_links, extract_metadata, extract_text};
pub use markdown::html_to_markdown;

use scraper::Html;
use std::collections::HashMap;
use url::Url;

/// Everything extracted from one fetched page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Whitespace-collapsed visible text
    pub content: String,

    /// Markdown rendition of the document
    pub markdown: String,

    /// Title, description, language, og:* tags, and the source URL
    pub metadata: HashMap<String, String>,

    /// Absolute URLs discovered on the page, for frontier expansion
    pub links: Vec<String>,
}

/// Runs the full extraction pipeline over a fetched document
///
/// `base_url` is the final URL after redirects; relative links resolve
/// against it and it is recorded as `sourceURL` in the metadata.
pub fn extract_page(html: &str, base_url: &Url) -> ExtractedPage {
    let document = Html::parse_document(html);

    let mut metadata = extract_metadata(&document);
    metadata.insert("sourceURL".to_string(), base_url.to_string());

    ExtractedPage {
        content: extract_text(&document),
        markdown: html_to_markdown(html, base_url),
        metadata,
        links: extract_links(&document, base_url),
    }
}
