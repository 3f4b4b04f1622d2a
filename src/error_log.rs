//! Durable append-only log of fetch-layer failures.

use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ErrorLogError {
    #[error("Failed to append to error log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One line per failed fetch: `status <code> -- <message> -- <url>`.
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    // Serializes appends so lines from concurrent workers never interleave
    write_lock: Mutex<()>,
}

impl ErrorLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format_line(status_code: u16, error_message: Option<&str>, url: &str) -> String {
        format!(
            "status {} -- {} -- {}",
            status_code,
            error_message.unwrap_or(""),
            url
        )
    }

    pub fn append(
        &self,
        status_code: u16,
        error_message: Option<&str>,
        url: &str,
    ) -> Result<(), ErrorLogError> {
        let line = Self::format_line(status_code, error_message, url);
        let _guard = self.write_lock.lock();

        let io_err = |source| ErrorLogError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        writeln!(file, "{}", line).map_err(io_err)?;
        Ok(())
    }
}
