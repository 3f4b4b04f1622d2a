//! Crawl scope: which links the frontier is allowed to receive.

use regex::Regex;
use url::Url;

use crate::config::{ConfigError, ScraperConfig};

/// Whitelist / blacklist / extension gate built once from the config.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    whitelist: Vec<String>,
    blacklist: Vec<String>,
    extension_pattern: Regex,
}

impl ScopeFilter {
    pub fn new(config: &ScraperConfig) -> Result<Self, ConfigError> {
        let alternatives = config
            .disallowed_extensions
            .iter()
            .map(|ext| regex::escape(&ext.to_ascii_lowercase()))
            .collect::<Vec<_>>()
            .join("|");
        let extension_pattern = Regex::new(&format!(r"\.(?:{})$", alternatives))
            .map_err(|e| ConfigError::Invalid(format!("disallowed_extensions: {}", e)))?;

        Ok(Self {
            whitelist: config
                .whitelist
                .iter()
                .filter(|w| !w.is_empty())
                .cloned()
                .collect(),
            blacklist: config
                .blacklist
                .iter()
                .filter(|b| !b.is_empty())
                .cloned()
                .collect(),
            extension_pattern,
        })
    }

    /// Decide whether `url` may be crawled. Fails closed on anything that does
    /// not parse as an absolute http(s) URL.
    pub fn is_in_scope(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(_) => return false,
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }

        let host = match parsed.host_str() {
            Some(h) => h.to_ascii_lowercase(),
            None => return false,
        };

        // Leading dot so ".ics.uci.edu/" cannot match "notics.uci.edu"
        let match_key = format!(".{}{}", host, parsed.path());
        if !self.whitelist.iter().any(|w| match_key.contains(w.as_str())) {
            return false;
        }

        if self.blacklist.iter().any(|b| url.contains(b.as_str())) {
            return false;
        }

        !self
            .extension_pattern
            .is_match(&parsed.path().to_ascii_lowercase())
    }
}
