//! URL handling: normalization, domain extraction, and the policy filter
//!
//! Everything in this module is pure and synchronous. The policy filter is
//! recomputed on every call; there is no cache to invalidate.

mod normalize;
mod policy;

pub use normalize::normalize_url;
pub use policy::{check_url, PolicyDecision, POLICY_MESSAGE};

use url::Url;

/// Extracts the lowercase host from a URL
///
/// Returns None for URLs without a host, which cannot occur for valid
/// http(s) URLs.
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
