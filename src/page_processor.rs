use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, ConfigError, ScraperConfig};
use crate::corpus::CorpusAggregator;
use crate::error_log::ErrorLog;
use crate::metrics::{PipelineMetrics, SharedMetrics};
use crate::models::FetchResult;
use crate::parser::{self, ParsedPage};
use crate::quality::QualityScorer;
use crate::scope::ScopeFilter;
use crate::tokenizer::{self, AlphanumericTokenizer, Tokenizer};
use crate::url_utils;

/// What happened to a page, for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Counted in the statistics and mined for links
    Admitted,
    /// Mined for links but too thin to count in the statistics
    LowInformation,
    /// Canonical URL was already processed
    DuplicateUrl,
    /// Same bytes already seen under another URL
    DuplicateContent,
    /// Body did not decode cleanly
    Undecodable,
    /// Status >= 600, written to the error log
    FetchError,
    /// Any other non-200 status
    Skipped,
}

/// Page-admission pipeline shared by all workers.
///
/// `process_page` never fails: anything it cannot use yields an empty link
/// list.
pub struct PageProcessor {
    scope: ScopeFilter,
    quality: QualityScorer,
    tokenizer: Box<dyn Tokenizer>,
    corpus: Arc<CorpusAggregator>,
    error_log: ErrorLog,
    metrics: SharedMetrics,
}

impl PageProcessor {
    /// Build the pipeline from config with the stock tokenizer.
    pub fn from_config(
        config: &ScraperConfig,
        corpus: Arc<CorpusAggregator>,
    ) -> Result<Self, ConfigError> {
        Self::with_tokenizer(config, corpus, Box::new(AlphanumericTokenizer))
    }

    pub fn with_tokenizer(
        config: &ScraperConfig,
        corpus: Arc<CorpusAggregator>,
        tokenizer: Box<dyn Tokenizer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scope: ScopeFilter::new(config)?,
            quality: QualityScorer::new(config.quality_cutoff),
            tokenizer,
            corpus,
            error_log: ErrorLog::new(&config.error_log_path),
            metrics: Arc::new(PipelineMetrics::new()),
        })
    }

    pub fn corpus(&self) -> &Arc<CorpusAggregator> {
        &self.corpus
    }

    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }

    pub fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    /// Run one fetched page through the pipeline and return the canonical,
    /// in-scope links for the frontier.
    pub fn process_page(&self, url: &str, response: &FetchResult) -> Vec<String> {
        self.process_page_with_outcome(url, response).0
    }

    pub fn process_page_with_outcome(
        &self,
        url: &str,
        response: &FetchResult,
    ) -> (Vec<String>, PageOutcome) {
        let start = Instant::now();
        self.metrics.pages_received.inc();

        let (links, outcome) = self.run_pipeline(url, response);

        match outcome {
            PageOutcome::Admitted => self.metrics.pages_admitted.inc(),
            PageOutcome::LowInformation => {
                self.metrics.pages_admitted.inc();
                self.metrics.low_information_pages.inc();
            }
            PageOutcome::DuplicateUrl => self.metrics.duplicate_urls.inc(),
            PageOutcome::DuplicateContent => self.metrics.duplicate_content.inc(),
            PageOutcome::Undecodable => self.metrics.undecodable_pages.inc(),
            PageOutcome::FetchError => self.metrics.fetch_errors.inc(),
            PageOutcome::Skipped => self.metrics.other_statuses.inc(),
        }
        self.metrics.links_emitted.add(links.len() as u64);
        self.metrics.record_latency(start.elapsed());

        tracing::debug!(url, ?outcome, links = links.len(), "Processed page");
        (links, outcome)
    }

    fn run_pipeline(&self, url: &str, response: &FetchResult) -> (Vec<String>, PageOutcome) {
        if response.status_code != Config::STATUS_OK {
            if response.status_code >= Config::FETCH_ERROR_STATUS_FLOOR {
                if let Err(e) = self.error_log.append(
                    response.status_code,
                    response.error_message.as_deref(),
                    url,
                ) {
                    tracing::warn!("{}", e);
                }
                return (Vec::new(), PageOutcome::FetchError);
            }
            tracing::debug!(url, status = response.status_code, "Skipping non-200 response");
            return (Vec::new(), PageOutcome::Skipped);
        }

        let canonical = url_utils::normalize(url);
        if !self.corpus.record_seen(&canonical) {
            return (Vec::new(), PageOutcome::DuplicateUrl);
        }
        // Page-visit count per unique URL, content duplicates included
        self.corpus.record_subdomain(&canonical);

        if self.corpus.is_duplicate_content(&response.body) {
            return (Vec::new(), PageOutcome::DuplicateContent);
        }

        let Some(html) = parser::decode_body(&response.body) else {
            tracing::debug!(url, "Body has replacement characters; no usable content");
            return (Vec::new(), PageOutcome::Undecodable);
        };
        let page = ParsedPage::parse(&html);

        let tokens = self.tokenizer.tokenize(&page.visible_text());
        let token_bytes = tokenizer::token_byte_count(&tokens);
        let outcome = if self
            .quality
            .is_high_information(token_bytes, response.body.len())
        {
            self.corpus.record_page(&canonical, &tokens, tokens.len());
            PageOutcome::Admitted
        } else {
            tracing::debug!(
                url,
                ratio = QualityScorer::information_ratio(token_bytes, response.body.len()),
                cutoff = self.quality.cutoff(),
                "Low-information page kept out of statistics"
            );
            PageOutcome::LowInformation
        };

        (self.filter_links(page.links()), outcome)
    }

    /// Keep in-scope links, then canonicalize and drop repeats within the page.
    ///
    /// Scope is judged on the raw href so blacklist patterns still see the
    /// query string and trailing slash that canonicalization removes.
    fn filter_links(&self, raw_links: Vec<String>) -> Vec<String> {
        self.metrics.links_extracted.add(raw_links.len() as u64);

        let mut seen = HashSet::new();
        raw_links
            .iter()
            .filter(|link| self.scope.is_in_scope(link))
            .map(|link| url_utils::normalize(link))
            .filter(|link| seen.insert(link.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn processor(dir: &TempDir) -> PageProcessor {
        let config = ScraperConfig {
            error_log_path: dir.path().join("errors.log"),
            ..ScraperConfig::default()
        };
        PageProcessor::from_config(&config, Arc::new(CorpusAggregator::default())).unwrap()
    }

    fn page(body: &str) -> FetchResult {
        FetchResult::new("https://www.ics.uci.edu/", 200, body)
    }

    #[test]
    fn test_non_200_skipped() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        let response = FetchResult::new("https://www.ics.uci.edu/missing", 404, "<a href=\"https://www.ics.uci.edu/x\">x</a>");
        let (links, outcome) = processor.process_page_with_outcome(&response.url, &response);

        assert!(links.is_empty());
        assert_eq!(outcome, PageOutcome::Skipped);
        assert_eq!(processor.corpus().unique_urls(), 0);
        assert!(!dir.path().join("errors.log").exists());
    }

    #[test]
    fn test_fetch_error_logged() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        let response = FetchResult::fetch_error("https://www.ics.uci.edu/slow", 603, "read timeout");
        let (links, outcome) = processor.process_page_with_outcome(&response.url, &response);

        assert!(links.is_empty());
        assert_eq!(outcome, PageOutcome::FetchError);
        let log = std::fs::read_to_string(dir.path().join("errors.log")).unwrap();
        assert_eq!(log, "status 603 -- read timeout -- https://www.ics.uci.edu/slow\n");
    }

    #[test]
    fn test_duplicate_url_processed_once() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);
        let body = "<html><body><p>unique words here</p><a href=\"https://www.ics.uci.edu/next\"></a></body></html>";

        let first = processor.process_page("https://www.ics.uci.edu/page#top", &page(body));
        let (second, outcome) =
            processor.process_page_with_outcome("https://www.ics.uci.edu/page/", &page("<p>changed</p>"));

        assert_eq!(first, vec!["https://www.ics.uci.edu/next".to_string()]);
        assert!(second.is_empty());
        assert_eq!(outcome, PageOutcome::DuplicateUrl);
        assert_eq!(processor.corpus().unique_urls(), 1);
        assert_eq!(processor.corpus().token_count("changed"), 0);
    }

    #[test]
    fn test_undecodable_body() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        let mut body = b"<a href=\"https://www.ics.uci.edu/a\">a</a>".to_vec();
        body.extend_from_slice(&[0xff, 0xfe, 0xfd]);
        let response = FetchResult::new("https://www.ics.uci.edu/bin", 200, body);
        let (links, outcome) = processor.process_page_with_outcome(&response.url, &response);

        assert!(links.is_empty());
        assert_eq!(outcome, PageOutcome::Undecodable);
        assert_eq!(processor.corpus().unique_urls(), 1);
        assert_eq!(processor.corpus().unique_tokens(), 0);
    }

    #[test]
    fn test_links_canonicalized_and_deduplicated() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);
        let body = concat!(
            "<html><body><p>links page with enough words to count</p>",
            "<a href=\"https://www.ics.uci.edu/a/\"></a>",
            "<a href=\"https://www.ics.uci.edu/a#frag\"></a>",
            "<a href=\"https://www.ics.uci.edu/a?session=1\"></a>",
            "<a href=\"https://www.ics.uci.edu/b\"></a>",
            "<a href=\"https://www.ics.uci.edu/paper.pdf\"></a>",
            "<a href=\"https://www.google.com/\"></a>",
            "</body></html>"
        );

        let links = processor.process_page("https://www.ics.uci.edu/links", &page(body));

        assert_eq!(
            links,
            vec![
                "https://www.ics.uci.edu/a".to_string(),
                "https://www.ics.uci.edu/b".to_string()
            ]
        );
        let snapshot = processor.metrics().snapshot();
        assert_eq!(snapshot.links_extracted, 6);
        assert_eq!(snapshot.links_emitted, 2);
    }

    #[test]
    fn test_trap_links_rejected_before_canonicalization() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);
        let body = concat!(
            "<html><body><p>calendar and sharing links on this page</p>",
            "<a href=\"https://www.ics.uci.edu/page?share=twitter\"></a>",
            "<a href=\"https://www.ics.uci.edu/events/calendar/\"></a>",
            "<a href=\"https://www.ics.uci.edu/x?tribe-bar-date=2019-01-01\"></a>",
            "<a href=\"https://www.ics.uci.edu/blog/?replytocom=12#respond\"></a>",
            "</body></html>"
        );

        let links = processor.process_page("https://www.ics.uci.edu/traps", &page(body));

        assert!(links.is_empty(), "trap links leaked: {:?}", links);
        let snapshot = processor.metrics().snapshot();
        assert_eq!(snapshot.links_extracted, 4);
        assert_eq!(snapshot.links_emitted, 0);
    }

    #[test]
    fn test_clean_link_survives_next_to_trap_variant() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);
        let body = concat!(
            "<html><body><p>one clean link and its shared variant</p>",
            "<a href=\"https://www.ics.uci.edu/page?share=facebook\"></a>",
            "<a href=\"https://www.ics.uci.edu/page/\"></a>",
            "</body></html>"
        );

        let links = processor.process_page("https://www.ics.uci.edu/mixed", &page(body));

        assert_eq!(links, vec!["https://www.ics.uci.edu/page".to_string()]);
    }

    #[test]
    fn test_low_information_page_still_emits_links() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);
        let padding = "x".repeat(4000);
        let body = format!(
            "<html><head><script>{}</script></head><body><p>tiny</p><a href=\"https://www.ics.uci.edu/next\"></a></body></html>",
            padding
        );

        let (links, outcome) =
            processor.process_page_with_outcome("https://www.ics.uci.edu/thin", &page(&body));

        assert_eq!(outcome, PageOutcome::LowInformation);
        assert_eq!(links, vec!["https://www.ics.uci.edu/next".to_string()]);
        assert_eq!(processor.corpus().token_count("tiny"), 0);
        assert_eq!(processor.corpus().longest_page(), None);
        assert_eq!(processor.corpus().subdomain_count("ics.uci.edu"), 1);
    }
}
