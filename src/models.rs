use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use thiserror::Error;

/// Response handed over by the fetch layer. Read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// URL the response was fetched from
    pub url: String,

    /// HTTP status code; 600 and above mark transport-level fetch failures
    pub status_code: u16,

    /// Raw response body
    pub body: Vec<u8>,

    /// Fetch-layer error description, if any
    pub error_message: Option<String>,
}

impl FetchResult {
    pub fn new(url: impl Into<String>, status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status_code,
            body: body.into(),
            error_message: None,
        }
    }

    /// Response for a fetch that never produced an HTTP reply.
    pub fn fetch_error(url: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code,
            body: Vec::new(),
            error_message: Some(message.into()),
        }
    }
}

/// One line of a replay file.
///
/// `body` carries text bodies as-is. Bodies that are not valid UTF-8 go in
/// `body_b64` instead, which takes precedence when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRecord {
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_b64: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TryFrom<FetchRecord> for FetchResult {
    type Error = base64::DecodeError;

    fn try_from(record: FetchRecord) -> Result<Self, Self::Error> {
        let body = match record.body_b64 {
            Some(encoded) => general_purpose::STANDARD.decode(encoded.trim())?,
            None => record.body.into_bytes(),
        };
        Ok(Self {
            url: record.url,
            status_code: record.status,
            body,
            error_message: record.error,
        })
    }
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bad body_b64 on line {line}: {source}")]
    Body {
        line: usize,
        #[source]
        source: base64::DecodeError,
    },
}

impl InputError {
    /// Line number of a record that can be skipped; `None` for read failures.
    pub fn malformed_line(&self) -> Option<usize> {
        match self {
            InputError::Parse { line, .. } | InputError::Body { line, .. } => Some(*line),
            InputError::Io(_) => None,
        }
    }
}

/// Read fetch records from JSON Lines, skipping blank lines.
pub fn read_fetch_records<R: BufRead>(reader: R) -> impl Iterator<Item = Result<FetchResult, InputError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(parse_record(&line, idx + 1)),
            Err(e) => Some(Err(InputError::Io(e))),
        })
}

fn parse_record(line: &str, line_number: usize) -> Result<FetchResult, InputError> {
    let record: FetchRecord = serde_json::from_str(line).map_err(|source| InputError::Parse {
        line: line_number,
        source,
    })?;
    FetchResult::try_from(record).map_err(|source| InputError::Body {
        line: line_number,
        source,
    })
}
