pub mod cli;
pub mod config;
pub mod corpus;
pub mod dedup;
pub mod error_log;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod page_processor;
pub mod parser;
pub mod quality;
pub mod replay;
pub mod report;
pub mod scope;
pub mod tokenizer;
pub mod url_utils;

// Re-export main types for library usage
pub use config::{Config, ConfigError, ScraperConfig};
pub use corpus::{CorpusAggregator, CorpusReport, LongestPage};
pub use dedup::{ContentDeduplicator, ContentHash};
pub use models::{FetchRecord, FetchResult};
pub use page_processor::{PageOutcome, PageProcessor};
pub use quality::QualityScorer;
pub use scope::ScopeFilter;
pub use tokenizer::{AlphanumericTokenizer, Tokenizer};
pub use url_utils::normalize;
