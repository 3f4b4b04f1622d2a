use rust_scraper::cli::{Cli, Commands};
use rust_scraper::config::{ConfigError, ScraperConfig};
use rust_scraper::corpus::CorpusAggregator;
use rust_scraper::logging::init_logging;
use rust_scraper::models::read_fetch_records;
use rust_scraper::page_processor::PageProcessor;
use rust_scraper::replay::{run_replay, ReplayError};
use rust_scraper::report::{write_json_report, write_text_report, ReportError};
use rust_scraper::scope::ScopeFilter;
use rust_scraper::url_utils;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MainError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

impl MainError {
    fn io(path: &str, source: std::io::Error) -> Self {
        MainError::Io {
            path: path.to_string(),
            source,
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_process(
    input: String,
    config_path: Option<String>,
    workers: usize,
    report: Option<String>,
    json_report: Option<String>,
    error_log: Option<String>,
    links_out: Option<String>,
    log_dir: String,
) -> Result<(), MainError> {
    let mut config = ScraperConfig::load_or_default(config_path.as_deref().map(Path::new))?;
    if let Some(path) = report {
        config.report_path = PathBuf::from(path);
    }
    if let Some(path) = error_log {
        config.error_log_path = PathBuf::from(path);
    }

    let _log_guards = init_logging(&log_dir).map_err(|e| MainError::Logging(e.to_string()))?;

    let corpus = Arc::new(CorpusAggregator::new(config.parent_domain.clone()));
    let processor = Arc::new(PageProcessor::from_config(&config, Arc::clone(&corpus))?);
    let metrics = Arc::clone(processor.metrics());

    let reader = BufReader::new(File::open(&input).map_err(|e| MainError::io(&input, e))?);

    let mut links_writer = match &links_out {
        Some(path) => Some(BufWriter::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| MainError::io(path, e))?,
        )),
        None => None,
    };

    tracing::info!(input = %input, workers, "Replaying fetch results");
    let result = run_replay(
        processor,
        read_fetch_records(reader),
        workers,
        links_writer.as_mut().map(|w| w as &mut dyn Write),
    )
    .await?;
    tracing::info!("Replay complete: {}", result);
    tracing::info!("{}", metrics.snapshot());

    let report = corpus.report(config.top_n);
    write_text_report(&report, &config.report_path)?;
    tracing::info!("Report written to {}", config.report_path.display());

    if let Some(path) = json_report {
        write_json_report(&report, &path)?;
        tracing::info!("JSON report written to {}", path);
    }

    Ok(())
}

fn run_check_url(config_path: Option<String>, urls: Vec<String>) -> Result<(), MainError> {
    let config = ScraperConfig::load_or_default(config_path.as_deref().map(Path::new))?;
    let scope = ScopeFilter::new(&config)?;

    for url in urls {
        let canonical = url_utils::normalize(&url);
        let verdict = if scope.is_in_scope(&canonical) {
            "in-scope"
        } else {
            "out-of-scope"
        };
        println!("{}\t{}\t{}", url, canonical, verdict);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let outcome = match cli.command {
        Commands::Process {
            input,
            config,
            workers,
            report,
            json_report,
            error_log,
            links_out,
            log_dir,
        } => {
            run_process(
                input,
                config,
                workers,
                report,
                json_report,
                error_log,
                links_out,
                log_dir,
            )
            .await
        }
        Commands::CheckUrl { config, urls } => run_check_url(config, urls),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(3);
    }
}
