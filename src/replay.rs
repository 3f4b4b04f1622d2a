//! Bounded worker pool that feeds fetch results through the pipeline.
//!
//! Every page runs in its own blocking task, so a page that panics surfaces
//! as a join error and the rest of the run carries on.

use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::models::{FetchResult, InputError};
use crate::page_processor::PageProcessor;

pub const PROGRESS_INTERVAL: usize = 1000;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Failed to write links: {0}")]
    LinksOutput(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayResult {
    pub processed: usize,
    pub failed: usize,
    /// URLs whose page task panicked
    pub failed_urls: Vec<String>,
    pub malformed: usize,
    pub links_emitted: usize,
    pub duration_ms: u64,
}

impl std::fmt::Display for ReplayResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} pages processed, {} failed, {} malformed, {} links emitted in {}ms",
            self.processed, self.failed, self.malformed, self.links_emitted, self.duration_ms
        )
    }
}

/// Process every page from `pages` with at most `max_workers` in flight.
///
/// Emitted links are written one per line to `links_out` as pages complete.
/// Malformed input lines are logged and skipped; read errors abort the run.
pub async fn run_replay<I>(
    processor: Arc<PageProcessor>,
    pages: I,
    max_workers: usize,
    mut links_out: Option<&mut dyn Write>,
) -> Result<ReplayResult, ReplayError>
where
    I: IntoIterator<Item = Result<FetchResult, InputError>>,
{
    let start = Instant::now();
    let max_workers = max_workers.max(1);
    let mut pages = pages.into_iter();
    let mut in_flight = JoinSet::new();
    // Lets a panicked task be traced back to its page
    let mut task_urls = HashMap::new();
    let mut exhausted = false;
    let mut result = ReplayResult::default();

    loop {
        // Phase 1: fill worker pool
        while !exhausted && in_flight.len() < max_workers {
            match pages.next() {
                Some(Ok(page)) => {
                    let processor = Arc::clone(&processor);
                    let url = page.url.clone();
                    let handle = in_flight
                        .spawn_blocking(move || processor.process_page(&page.url, &page));
                    task_urls.insert(handle.id(), url);
                }
                Some(Err(e)) => match e.malformed_line() {
                    Some(line) => {
                        tracing::warn!(line, "Skipping malformed record: {}", e);
                        result.malformed += 1;
                    }
                    None => return Err(e.into()),
                },
                None => exhausted = true,
            }
        }

        // Phase 2: collect one completed task
        match in_flight.join_next_with_id().await {
            Some(Ok((id, links))) => {
                let url = task_urls.remove(&id).unwrap_or_default();
                result.processed += 1;
                result.links_emitted += links.len();
                if let Some(out) = links_out.as_mut() {
                    for link in &links {
                        writeln!(out, "{}", link)?;
                    }
                }
                tracing::trace!(url, links = links.len(), "Page complete");

                if result.processed % PROGRESS_INTERVAL == 0 {
                    tracing::info!(
                        "Progress: {} processed | {}",
                        result.processed,
                        processor.metrics().snapshot()
                    );
                }
            }
            Some(Err(e)) => {
                let url = task_urls.remove(&e.id()).unwrap_or_default();
                tracing::error!(url = %url, "Page task failed: {}", e);
                result.failed += 1;
                result.failed_urls.push(url);
            }
            None if exhausted => break,
            None => {}
        }
    }

    if let Some(out) = links_out.as_mut() {
        out.flush()?;
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    Ok(result)
}
