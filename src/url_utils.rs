//! URL utilities for consistent dedup keys and subdomain bucketing.

use url::Url;

/// Canonicalize a URL so equivalent links share one dedup key.
///
/// Cuts at the first `#` or `?` (a marker at position 0 is left alone) and then
/// strips trailing slashes. Never fails; an empty input stays empty.
pub fn normalize(url: &str) -> String {
    let cut = url
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '#' || *c == '?')
        .map(|(i, _)| i)
        .unwrap_or(url.len());

    url[..cut].trim_end_matches('/').to_string()
}

pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_ascii_lowercase()))
}

/// Subdomain bucket for `host` under `parent_domain`.
///
/// `www.` is dropped so `www.ics.uci.edu` and `ics.uci.edu` share a bucket.
/// Hosts outside the parent domain (including look-alikes such as
/// `notics.uci.edu`) have no bucket.
pub fn subdomain_key(host: &str, parent_domain: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let parent = parent_domain.trim_matches('.').to_ascii_lowercase();
    if parent.is_empty() {
        return None;
    }

    let key = host.strip_prefix("www.").unwrap_or(&host);
    if key == parent || key.ends_with(&format!(".{}", parent)) {
        Some(key.to_string())
    } else {
        None
    }
}
