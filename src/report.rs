use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::corpus::CorpusReport;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl fmt::Display for CorpusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Top {} tokens:", self.top_tokens.len())?;
        for (token, count) in &self.top_tokens {
            writeln!(f, "{} {}", token, count)?;
        }

        writeln!(f)?;
        writeln!(f, "Subdomains ({}):", self.subdomains.len())?;
        for (subdomain, count) in &self.subdomains {
            writeln!(f, "{} {}", subdomain, count)?;
        }

        writeln!(f)?;
        writeln!(f, "Summary:")?;
        writeln!(f, "unique_tokens {}", self.unique_tokens)?;
        match &self.longest_page {
            Some(page) => writeln!(f, "longest_page {} {}", page.url, page.token_count)?,
            None => writeln!(f, "longest_page none 0")?,
        }
        writeln!(f, "unique_urls {}", self.unique_urls)?;
        writeln!(f, "unique_contents {}", self.unique_contents)
    }
}

/// Write the human-readable report, replacing any previous file.
pub fn write_text_report<P: AsRef<Path>>(report: &CorpusReport, output_path: P) -> Result<(), ReportError> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(output_path)?;
    write!(file, "{}", report)?;
    Ok(())
}

/// Write the report as pretty-printed JSON for downstream tooling.
pub fn write_json_report<P: AsRef<Path>>(report: &CorpusReport, output_path: P) -> Result<(), ReportError> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(output_path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::LongestPage;
    use tempfile::TempDir;

    fn sample() -> CorpusReport {
        CorpusReport {
            top_tokens: vec![("hello".to_string(), 2), ("world".to_string(), 1)],
            subdomains: vec![("vision.ics.uci.edu".to_string(), 3)],
            unique_tokens: 2,
            longest_page: Some(LongestPage {
                url: "https://www.ics.uci.edu/a".to_string(),
                token_count: 3,
            }),
            unique_urls: 4,
            unique_contents: 3,
        }
    }

    #[test]
    fn test_text_format() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Top 2 tokens:");
        assert_eq!(lines[1], "hello 2");
        assert_eq!(lines[2], "world 1");
        assert!(lines.contains(&"vision.ics.uci.edu 3"));
        assert!(lines.contains(&"longest_page https://www.ics.uci.edu/a 3"));
        assert!(lines.contains(&"unique_urls 4"));
    }

    #[test]
    fn test_empty_report() {
        let report = CorpusReport {
            top_tokens: Vec::new(),
            subdomains: Vec::new(),
            unique_tokens: 0,
            longest_page: None,
            unique_urls: 0,
            unique_contents: 0,
        };
        assert!(report.to_string().contains("longest_page none 0"));
    }

    #[test]
    fn test_write_reports() {
        let dir = TempDir::new().unwrap();
        let text_path = dir.path().join("results.txt");
        let json_path = dir.path().join("results.json");

        write_text_report(&sample(), &text_path).unwrap();
        write_json_report(&sample(), &json_path).unwrap();

        let text = std::fs::read_to_string(&text_path).unwrap();
        assert!(text.starts_with("Top 2 tokens:\nhello 2\n"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["unique_urls"], 4);
        assert_eq!(json["top_tokens"][0][0], "hello");
    }
}
