//! Metadata, visible-text, and link extraction from parsed HTML

use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

/// Open Graph properties copied into page metadata when present
const OG_PROPERTIES: &[(&str, &str)] = &[
    ("og:title", "ogTitle"),
    ("og:description", "ogDescription"),
    ("og:url", "ogUrl"),
    ("og:image", "ogImage"),
];

/// Extracts document metadata as a flat string map
///
/// Keys: `title`, `description`, `language`, `keywords`, and the `og*`
/// variants. Absent values are simply omitted.
pub fn extract_metadata(document: &Html) -> HashMap<String, String> {
    let mut metadata = HashMap::new();

    if let Ok(selector) = Selector::parse("title") {
        if let Some(element) = document.select(&selector).next() {
            let title = element.text().collect::<String>().trim().to_string();
            if !title.is_empty() {
                metadata.insert("title".to_string(), title);
            }
        }
    }

    if let Ok(selector) = Selector::parse("html") {
        if let Some(element) = document.select(&selector).next() {
            if let Some(lang) = element.value().attr("lang") {
                metadata.insert("language".to_string(), lang.to_string());
            }
        }
    }

    for (name, key) in [("description", "description"), ("keywords", "keywords")] {
        if let Some(value) = meta_content(document, &format!("meta[name='{}']", name)) {
            metadata.insert(key.to_string(), value);
        }
    }

    for (property, key) in OG_PROPERTIES {
        if let Some(value) = meta_content(document, &format!("meta[property='{}']", property)) {
            metadata.insert(key.to_string(), value);
        }
    }

    metadata
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the visible text of the document body, whitespace-collapsed
///
/// Script, style, and noscript contents are dropped.
pub fn extract_text(document: &Html) -> String {
    let selector = match Selector::parse("body") {
        Ok(s) => s,
        Err(_) => return String::new(),
    };

    let body = match document.select(&selector).next() {
        Some(b) => b,
        None => return String::new(),
    };

    let mut pieces = Vec::new();
    for node in body.descendants() {
        if let Some(text) = node.value().as_text() {
            let in_hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .map(|e| matches!(e.name(), "script" | "style" | "noscript" | "template"))
                    .unwrap_or(false)
            });
            if in_hidden {
                continue;
            }
            let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !collapsed.is_empty() {
                pieces.push(collapsed);
            }
        }
    }

    pieces.join(" ")
}

/// Extracts all followable links as absolute URLs
///
/// `<a href>` values are resolved against the base URL. Skipped: download
/// links, `javascript:` / `mailto:` / `tel:` / `data:` schemes,
/// fragment-only anchors, and anything that does not resolve to http(s).
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_link(href, base_url) {
                    links.push(absolute);
                }
            }
        }
    }

    links
}

/// Resolves a raw href, returning None when the link must be skipped
pub(crate) fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_metadata_title_and_description() {
        let doc = parse(
            r#"<html><head><title> My Site </title>
            <meta name="description" content="About things"></head></html>"#,
        );
        let meta = extract_metadata(&doc);
        assert_eq!(meta.get("title").map(String::as_str), Some("My Site"));
        assert_eq!(
            meta.get("description").map(String::as_str),
            Some("About things")
        );
    }

    #[test]
    fn test_metadata_language() {
        let doc = parse(r#"<html lang="fr"><head></head><body></body></html>"#);
        let meta = extract_metadata(&doc);
        assert_eq!(meta.get("language").map(String::as_str), Some("fr"));
    }

    #[test]
    fn test_metadata_open_graph() {
        let doc = parse(
            r#"<html><head>
            <meta property="og:title" content="OG Title">
            <meta property="og:image" content="https://example.com/img.png">
            </head></html>"#,
        );
        let meta = extract_metadata(&doc);
        assert_eq!(meta.get("ogTitle").map(String::as_str), Some("OG Title"));
        assert_eq!(
            meta.get("ogImage").map(String::as_str),
            Some("https://example.com/img.png")
        );
    }

    #[test]
    fn test_metadata_missing_fields_omitted() {
        let doc = parse("<html><head></head><body></body></html>");
        let meta = extract_metadata(&doc);
        assert!(!meta.contains_key("title"));
        assert!(!meta.contains_key("description"));
    }

    #[test]
    fn test_text_collapses_whitespace() {
        let doc = parse("<html><body><p>Hello\n\n   world</p><p>again</p></body></html>");
        let text = extract_text(&doc);
        assert_eq!(text, "Hello world again");
    }

    #[test]
    fn test_text_skips_script_and_style() {
        let doc = parse(
            r#"<html><body><p>Visible</p>
            <script>var hidden = 1;</script>
            <style>.x { color: red }</style></body></html>"#,
        );
        let text = extract_text(&doc);
        assert_eq!(text, "Visible");
    }

    #[test]
    fn test_links_resolve_relative() {
        let doc = parse(r#"<html><body><a href="/other">x</a></body></html>"#);
        assert_eq!(extract_links(&doc, &base()), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_links_keep_absolute() {
        let doc = parse(r#"<html><body><a href="https://other.com/p">x</a></body></html>"#);
        assert_eq!(extract_links(&doc, &base()), vec!["https://other.com/p"]);
    }

    #[test]
    fn test_links_skip_special_schemes() {
        let doc = parse(
            r##"<html><body>
            <a href="javascript:void(0)">a</a>
            <a href="mailto:x@example.com">b</a>
            <a href="tel:+123">c</a>
            <a href="data:text/html,hi">d</a>
            <a href="#top">e</a>
            </body></html>"##,
        );
        assert!(extract_links(&doc, &base()).is_empty());
    }

    #[test]
    fn test_links_skip_download_attribute() {
        let doc = parse(r#"<html><body><a href="/f.pdf" download>get</a></body></html>"#);
        assert!(extract_links(&doc, &base()).is_empty());
    }

    #[test]
    fn test_links_follow_nofollow() {
        let doc = parse(r#"<html><body><a href="/p" rel="nofollow">x</a></body></html>"#);
        assert_eq!(extract_links(&doc, &base()), vec!["https://example.com/p"]);
    }
}
