//! Corpus-wide statistics shared by every worker for the lifetime of a run.
//!
//! Each structure carries its own synchronization so workers only contend
//! on the shard or record they touch.

use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dedup::ContentDeduplicator;
use crate::url_utils;

#[derive(Debug, Clone, Copy)]
struct TokenStat {
    count: u64,
    // Insertion order, used to break count ties in the report
    first_seen: u64,
}

/// Page with the most tokens seen so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestPage {
    pub url: String,
    pub token_count: usize,
}

/// Point-in-time view of the aggregator, sorted for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusReport {
    pub top_tokens: Vec<(String, u64)>,
    pub subdomains: Vec<(String, u64)>,
    pub unique_tokens: usize,
    pub longest_page: Option<LongestPage>,
    pub unique_urls: usize,
    pub unique_contents: usize,
}

pub struct CorpusAggregator {
    parent_domain: String,
    tokens: DashMap<String, TokenStat>,
    token_sequence: AtomicU64,
    longest_page: Mutex<Option<LongestPage>>,
    subdomains: DashMap<String, u64>,
    seen_urls: DashSet<String>,
    content: ContentDeduplicator,
}

impl CorpusAggregator {
    pub fn new(parent_domain: impl Into<String>) -> Self {
        Self {
            parent_domain: parent_domain.into(),
            tokens: DashMap::new(),
            token_sequence: AtomicU64::new(0),
            longest_page: Mutex::new(None),
            subdomains: DashMap::new(),
            seen_urls: DashSet::new(),
            content: ContentDeduplicator::new(),
        }
    }

    /// Count every token of an admitted page and update the longest-page record.
    ///
    /// Ties keep the earlier record.
    pub fn record_page(&self, url: &str, tokens: &[String], token_count: usize) {
        for token in tokens {
            self.tokens
                .entry(token.clone())
                .and_modify(|stat| stat.count += 1)
                .or_insert_with(|| TokenStat {
                    count: 1,
                    first_seen: self.token_sequence.fetch_add(1, Ordering::Relaxed),
                });
        }

        let mut longest = self.longest_page.lock();
        let replace = match longest.as_ref() {
            Some(current) => token_count > current.token_count,
            None => token_count > 0,
        };
        if replace {
            *longest = Some(LongestPage {
                url: url.to_string(),
                token_count,
            });
        }
    }

    /// Bump the page count of the subdomain `url` belongs to.
    ///
    /// Returns the bucket, or `None` when the URL is outside the parent domain
    /// or has no parsable host.
    pub fn record_subdomain(&self, url: &str) -> Option<String> {
        let Some(host) = url_utils::extract_host(url) else {
            tracing::warn!(url, "Could not derive subdomain; no host");
            return None;
        };
        let key = url_utils::subdomain_key(&host, &self.parent_domain)?;
        *self.subdomains.entry(key.clone()).or_insert(0) += 1;
        Some(key)
    }

    /// Returns true the first time a canonical URL is seen.
    pub fn record_seen(&self, url: &str) -> bool {
        self.seen_urls.insert(url.to_string())
    }

    /// Atomic check-and-insert of the body hash; true if already seen.
    pub fn is_duplicate_content(&self, body: &[u8]) -> bool {
        self.content.is_duplicate(body)
    }

    pub fn token_count(&self, token: &str) -> u64 {
        self.tokens.get(token).map(|stat| stat.count).unwrap_or(0)
    }

    pub fn total_token_occurrences(&self) -> u64 {
        self.tokens.iter().map(|entry| entry.count).sum()
    }

    pub fn unique_tokens(&self) -> usize {
        self.tokens.len()
    }

    pub fn subdomain_count(&self, subdomain: &str) -> u64 {
        self.subdomains.get(subdomain).map(|c| *c).unwrap_or(0)
    }

    pub fn unique_urls(&self) -> usize {
        self.seen_urls.len()
    }

    pub fn has_seen(&self, url: &str) -> bool {
        self.seen_urls.contains(url)
    }

    pub fn unique_contents(&self) -> usize {
        self.content.len()
    }

    pub fn longest_page(&self) -> Option<LongestPage> {
        self.longest_page.lock().clone()
    }

    /// Sort the full token map; meant for end-of-run reporting, not per page.
    pub fn report(&self, top_n: usize) -> CorpusReport {
        let mut tokens: Vec<(String, TokenStat)> = self
            .tokens
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        tokens.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });
        let unique_tokens = tokens.len();
        let top_tokens = tokens
            .into_iter()
            .take(top_n)
            .map(|(token, stat)| (token, stat.count))
            .collect();

        let mut subdomains: Vec<(String, u64)> = self
            .subdomains
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        subdomains.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        CorpusReport {
            top_tokens,
            subdomains,
            unique_tokens,
            longest_page: self.longest_page(),
            unique_urls: self.unique_urls(),
            unique_contents: self.unique_contents(),
        }
    }
}

impl Default for CorpusAggregator {
    fn default() -> Self {
        Self::new("ics.uci.edu")
    }
}
