//! URL policy filter
//!
//! A fixed blocklist of social-media domains that the service refuses to
//! scrape. The filter runs for the root URL before a job is created and for
//! every discovered URL before it enters a crawl frontier; discovered URLs
//! that match are dropped silently rather than failing the job.

use url::Url;

/// The denial message surfaced to clients for blocked URLs
pub const POLICY_MESSAGE: &str =
    "This service does not support social media scraping due to policy restrictions.";

/// Domains (and all their subdomains) that are never scraped
const BLOCKED_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
    "pinterest.com",
    "snapchat.com",
    "tiktok.com",
    "reddit.com",
    "whatsapp.com",
    "telegram.org",
];

/// The outcome of a policy check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl PolicyDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn block() -> Self {
        Self {
            allowed: false,
            reason: Some(POLICY_MESSAGE.to_string()),
        }
    }
}

/// Checks a URL against the blocklist
///
/// Matching is domain-aware: `facebook.com` and `m.facebook.com` are blocked,
/// `notfacebook.com` is not. Pure, no I/O, no state.
pub fn check_url(url: &Url) -> PolicyDecision {
    let host = match url.host_str() {
        Some(h) => h.to_lowercase(),
        None => return PolicyDecision::allow(),
    };

    for blocked in BLOCKED_DOMAINS {
        if domain_matches(blocked, &host) {
            return PolicyDecision::block();
        }
    }

    PolicyDecision::allow()
}

/// True when the candidate is the base domain or any subdomain of it
fn domain_matches(base: &str, candidate: &str) -> bool {
    candidate == base || candidate.ends_with(&format!(".{}", base))
}
