// Global configuration constants - single source of truth

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub struct Config;

impl Config {
    // Response status handling
    pub const STATUS_OK: u16 = 200;
    pub const FETCH_ERROR_STATUS_FLOOR: u16 = 600;

    // Page quality (tokenized bytes / raw bytes), tuned against the ICS corpus
    pub const QUALITY_CUTOFF: f64 = 0.008022722285;

    // Reporting
    pub const TOP_N_TOKENS: usize = 50;

    // Replay worker pool
    pub const DEFAULT_WORKERS: usize = 8;
}

const DEFAULT_WHITELIST: &[&str] = &[
    ".ics.uci.edu/",
    ".cs.uci.edu/",
    ".informatics.uci.edu/",
    ".stat.uci.edu/",
    ".today.uci.edu/department/information_computer_sciences",
];

// Crawler traps inside allowed domains (event calendars, share/login loops)
const DEFAULT_BLACKLIST: &[&str] = &[
    "wics.ics.uci.edu/events",
    "/events/category/boothing",
    "/calendar/",
    "ical=",
    "tribe-bar-date=",
    "replytocom=",
    "share=",
];

const DEFAULT_EXTENSIONS: &[&str] = &[
    "css", "js", "bmp", "gif", "jpeg", "jpg", "ico", "png", "tif", "tiff", "mid", "mp2", "mp3",
    "mp4", "wav", "avi", "mov", "mpeg", "ram", "m4v", "mkv", "ogg", "ogv", "pdf", "ps", "eps",
    "tex", "ppt", "pptx", "ppsx", "doc", "docx", "xls", "xlsx", "names", "data", "dat", "exe",
    "bz2", "tar", "msi", "bin", "7z", "psd", "dmg", "iso", "epub", "dll", "cnf", "tgz", "sha1",
    "thmx", "mso", "arff", "rtf", "jar", "csv", "rm", "smil", "wmv", "swf", "wma", "zip", "rar",
    "gz",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration for the page-admission pipeline.
///
/// Every field has a default, so a TOML file only needs to name what it
/// overrides:
///
/// ```toml
/// whitelist = [".ics.uci.edu/"]
/// quality_cutoff = 0.01
/// top_n = 100
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Substrings of `"." + host + path`; a link must contain at least one.
    pub whitelist: Vec<String>,
    /// Substrings of the raw URL that mark a crawler trap.
    pub blacklist: Vec<String>,
    /// File extensions (without the dot) that are never crawled.
    pub disallowed_extensions: Vec<String>,
    /// Pages at or below this information ratio are kept out of the statistics.
    pub quality_cutoff: f64,
    /// Number of tokens listed in the report.
    pub top_n: usize,
    /// Parent domain used to bucket pages by subdomain.
    pub parent_domain: String,
    /// Append-only log for fetch-layer errors (status >= 600).
    pub error_log_path: PathBuf,
    /// Destination of the end-of-run report.
    pub report_path: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            whitelist: DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            disallowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            quality_cutoff: Config::QUALITY_CUTOFF,
            top_n: Config::TOP_N_TOKENS,
            parent_domain: "ics.uci.edu".to_string(),
            error_log_path: PathBuf::from("errors.log"),
            report_path: PathBuf::from("results.txt"),
        }
    }
}

impl ScraperConfig {
    /// Load a TOML config file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScraperConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.quality_cutoff.is_finite() || !(0.0..=1.0).contains(&self.quality_cutoff) {
            return Err(ConfigError::Invalid(format!(
                "quality_cutoff must be within [0, 1], got {}",
                self.quality_cutoff
            )));
        }
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be greater than 0".to_string()));
        }
        if self.whitelist.iter().all(|w| w.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "whitelist must contain at least one non-empty entry".to_string(),
            ));
        }
        if self.disallowed_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "disallowed_extensions must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .disallowed_extensions
            .iter()
            .find(|ext| ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(ConfigError::Invalid(format!(
                "disallowed extension {:?} must be alphanumeric and given without a dot",
                bad
            )));
        }
        Ok(())
    }
}
