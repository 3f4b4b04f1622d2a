//! Exact-duplicate detection over raw page bytes.
//!
//! Two different URLs serving identical bytes (mirrors, session-id variants,
//! printer-friendly copies) are only tokenized and mined for links once.

use dashmap::DashSet;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest of a page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn compute(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        ContentHash(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Set of content hashes seen so far in the crawl.
#[derive(Debug, Default)]
pub struct ContentDeduplicator {
    seen: DashSet<ContentHash>,
}

impl ContentDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if these bytes were already seen; otherwise records them.
    ///
    /// Check and insert happen under one shard lock, so two workers racing on
    /// the same body cannot both see it as new.
    pub fn is_duplicate(&self, content: &[u8]) -> bool {
        !self.seen.insert(ContentHash::compute(content))
    }

    pub fn contains(&self, content: &[u8]) -> bool {
        self.seen.contains(&ContentHash::compute(content))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
