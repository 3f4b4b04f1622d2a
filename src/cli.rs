use clap::{Parser, Subcommand};

use crate::config::Config;

/// CLI entry point so fetched pages can be replayed through the pipeline.
/// Exit codes: 0=success, 2=invalid arguments, 3=I/O or config error
#[derive(Parser, Debug)]
#[command(name = "rust_scraper")]
#[command(about = "Page admission, link extraction and corpus statistics for a crawl")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run fetched pages (JSON Lines: url, status, body, error) through the pipeline.
    Process {
        #[arg(short, long, help = "JSON Lines file of fetch results")]
        input: String,

        #[arg(short, long, help = "TOML config file (defaults apply when omitted)")]
        config: Option<String>,

        #[arg(
            short,
            long,
            default_value_t = Config::DEFAULT_WORKERS,
            help = "Pages processed concurrently"
        )]
        workers: usize,

        #[arg(short, long, help = "Text report path (overrides report_path in config)")]
        report: Option<String>,

        #[arg(long, help = "Also write the report as JSON to this path")]
        json_report: Option<String>,

        #[arg(long, help = "Fetch-error log path (overrides error_log_path in config)")]
        error_log: Option<String>,

        #[arg(long, help = "Append emitted links to this file, one per line")]
        links_out: Option<String>,

        #[arg(long, default_value = "./logs", help = "Directory for log files")]
        log_dir: String,
    },

    /// Show the canonical form and scope decision for each URL.
    CheckUrl {
        #[arg(short, long, help = "TOML config file (defaults apply when omitted)")]
        config: Option<String>,

        #[arg(required = true, help = "URLs to check")]
        urls: Vec<String>,
    },
}

impl Cli {
    /// Parse CLI arguments so the rest of the program can rely on structured options.
    /// On error, clap prints help and exits with code 2 (usage error).
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
