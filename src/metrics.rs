use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Latency histogram in microseconds; page processing is sub-millisecond for
/// most pages so the buckets start small.
#[derive(Debug, Clone)]
pub struct Histogram {
    buckets: Vec<(u64, u64)>,
    sum_us: u64,
    count: u64,
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            buckets: vec![
                (100, 0),
                (500, 0),
                (1_000, 0),
                (5_000, 0),
                (10_000, 0),
                (50_000, 0),
                (100_000, 0),
                (u64::MAX, 0),
            ],
            sum_us: 0,
            count: 0,
        }
    }

    pub fn observe(&mut self, value_us: u64) {
        self.sum_us = self.sum_us.saturating_add(value_us);
        self.count += 1;

        for (threshold, count) in &mut self.buckets {
            if value_us <= *threshold {
                *count += 1;
                break;
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean_us(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.sum_us / self.count
        }
    }

    /// Upper bound of the bucket holding the given quantile (0.0-1.0).
    pub fn quantile_upper_bound(&self, q: f64) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let target = ((self.count as f64) * q.clamp(0.0, 1.0)).ceil().max(1.0) as u64;
        let mut seen = 0;
        for (threshold, count) in &self.buckets {
            seen += count;
            if seen >= target {
                return *threshold;
            }
        }
        u64::MAX
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

// Atomic counter for lock-free metric updates
#[derive(Debug)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self { value: AtomicU64::new(0) }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome counters for every page the pipeline sees.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    pub processing_latency: Mutex<Histogram>,

    pub pages_received: Counter,
    pub pages_admitted: Counter,
    pub duplicate_urls: Counter,
    pub duplicate_content: Counter,
    pub undecodable_pages: Counter,
    pub low_information_pages: Counter,
    pub fetch_errors: Counter,
    pub other_statuses: Counter,
    pub links_extracted: Counter,
    pub links_emitted: Counter,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_latency(&self, duration: Duration) {
        let us = duration.as_micros().min(u64::MAX as u128) as u64;
        self.processing_latency.lock().observe(us);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let latency = self.processing_latency.lock();
        MetricsSnapshot {
            pages_received: self.pages_received.get(),
            pages_admitted: self.pages_admitted.get(),
            duplicate_urls: self.duplicate_urls.get(),
            duplicate_content: self.duplicate_content.get(),
            undecodable_pages: self.undecodable_pages.get(),
            low_information_pages: self.low_information_pages.get(),
            fetch_errors: self.fetch_errors.get(),
            other_statuses: self.other_statuses.get(),
            links_extracted: self.links_extracted.get(),
            links_emitted: self.links_emitted.get(),
            latency_mean_us: latency.mean_us(),
            latency_p99_us: latency.quantile_upper_bound(0.99),
        }
    }
}

pub type SharedMetrics = Arc<PipelineMetrics>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub pages_received: u64,
    pub pages_admitted: u64,
    pub duplicate_urls: u64,
    pub duplicate_content: u64,
    pub undecodable_pages: u64,
    pub low_information_pages: u64,
    pub fetch_errors: u64,
    pub other_statuses: u64,
    pub links_extracted: u64,
    pub links_emitted: u64,
    pub latency_mean_us: u64,
    pub latency_p99_us: u64,
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pages: {} received, {} admitted, {} dup-url, {} dup-content, {} undecodable, {} low-info, {} fetch-error, {} other-status | Links: {} extracted, {} emitted | Latency: mean {}us, p99 <= {}us",
            self.pages_received,
            self.pages_admitted,
            self.duplicate_urls,
            self.duplicate_content,
            self.undecodable_pages,
            self.low_information_pages,
            self.fetch_errors,
            self.other_statuses,
            self.links_extracted,
            self.links_emitted,
            self.latency_mean_us,
            self.latency_p99_us,
        )
    }
}
