use crate::UrlError;
use url::Url;

/// Tracking query parameters stripped during normalization
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// Normalizes a URL for frontier deduplication
///
/// Two URLs that normalize to the same string are the same page as far as
/// the crawler is concerned. Steps:
///
/// 1. Parse; reject malformed input
/// 2. Reject non-http(s) schemes
/// 3. Lowercase the host and strip a leading `www.`
/// 4. Drop the fragment
/// 5. Strip tracking query parameters, sort the rest
/// 6. Collapse a trailing slash (except for the root path)
///
/// # Examples
///
/// ```
/// use smolder::normalize_url;
///
/// let url = normalize_url("https://WWW.Example.COM/docs/?utm_source=x").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?;
    let mut host = host.to_lowercase();
    if let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("failed to set host: {}", e)))?;

    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !is_tracking_param(k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.sort_by(|a, b| a.0.cmp(&b.0));

        if params.is_empty() {
            url.set_query(None);
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
    }

    // Trailing slash is not significant except at the root
    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Ok(url)
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_host() {
        let url = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_strip_www() {
        let url = normalize_url("https://www.example.com/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_strip_fragment() {
        let url = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_strip_trailing_slash() {
        let url = normalize_url("https://example.com/docs/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs");
    }

    #[test]
    fn test_keep_root_slash() {
        let url = normalize_url("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_strip_tracking_params() {
        let url = normalize_url("https://example.com/p?utm_source=a&fbclid=b").unwrap();
        assert_eq!(url.as_str(), "https://example.com/p");
    }

    #[test]
    fn test_sort_surviving_params() {
        let url = normalize_url("https://example.com/p?b=2&a=1&utm_medium=x").unwrap();
        assert_eq!(url.as_str(), "https://example.com/p?a=1&b=2");
    }

    #[test]
    fn test_reject_non_http_scheme() {
        let result = normalize_url("ftp://example.com/file");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_reject_malformed() {
        assert!(normalize_url("not a url").is_err());
    }

    #[test]
    fn test_http_preserved() {
        // Mock servers in tests are plain http; the scheme is kept as given.
        let url = normalize_url("http://127.0.0.1:3002/page").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3002/page");
    }

    #[test]
    fn test_custom_utm_param_stripped() {
        let url = normalize_url("https://example.com/p?utm_custom=1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/p");
    }
}
