/// Information-density gate for corpus statistics.
///
/// A page whose tokenized text is a tiny fraction of its raw bytes is mostly
/// markup or boilerplate. Such pages still feed the frontier but stay out of
/// the token map and the longest-page record.
#[derive(Debug, Clone, Copy)]
pub struct QualityScorer {
    cutoff: f64,
}

impl QualityScorer {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Tokenized bytes over raw bytes. An empty body scores 0.
    pub fn information_ratio(token_bytes: usize, raw_bytes: usize) -> f64 {
        if raw_bytes == 0 {
            return 0.0;
        }
        token_bytes as f64 / raw_bytes as f64
    }

    pub fn is_high_information(&self, token_bytes: usize, raw_bytes: usize) -> bool {
        Self::information_ratio(token_bytes, raw_bytes) > self.cutoff
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(crate::config::Config::QUALITY_CUTOFF)
    }
}
