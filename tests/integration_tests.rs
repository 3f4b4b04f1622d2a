use rust_scraper::report::write_text_report;
use rust_scraper::*;
use std::sync::Arc;
use tempfile::TempDir;

fn build(dir: &TempDir) -> (PageProcessor, Arc<CorpusAggregator>) {
    let config = ScraperConfig {
        error_log_path: dir.path().join("errors.log"),
        report_path: dir.path().join("results.txt"),
        ..ScraperConfig::default()
    };
    let corpus = Arc::new(CorpusAggregator::new(config.parent_domain.clone()));
    let processor = PageProcessor::from_config(&config, Arc::clone(&corpus)).unwrap();
    (processor, corpus)
}

const END_TO_END_PAGE: &str = concat!(
    "<html><head><title>ICS Home</title></head><body>",
    "<p>hello world hello</p>",
    "<a href=\"https://www.ics.uci.edu/about/\"></a>",
    "<a href=\"https://vision.ics.uci.edu/papers#recent\"></a>",
    "<a href=\"/relative/path\"></a>",
    "<a href=\"https://wics.ics.uci.edu/events/2019-01-01\"></a>",
    "</body></html>"
);

#[test]
fn test_end_to_end_page() {
    let dir = TempDir::new().unwrap();
    let (processor, corpus) = build(&dir);

    let response = FetchResult::new("https://www.ics.uci.edu/", 200, END_TO_END_PAGE);
    let links = processor.process_page(&response.url, &response);

    assert_eq!(
        links,
        vec![
            "https://www.ics.uci.edu/about".to_string(),
            "https://vision.ics.uci.edu/papers".to_string(),
        ]
    );
    assert_eq!(corpus.token_count("hello"), 2);
    assert_eq!(corpus.token_count("world"), 1);
    assert_eq!(corpus.token_count("ics"), 0, "title text is not visible");
    assert_eq!(corpus.unique_tokens(), 2);
    assert_eq!(
        corpus.longest_page(),
        Some(LongestPage {
            url: "https://www.ics.uci.edu".to_string(),
            token_count: 3
        })
    );
}

#[test]
fn test_same_content_under_two_urls() {
    let dir = TempDir::new().unwrap();
    let (processor, corpus) = build(&dir);

    let first = FetchResult::new("https://www.ics.uci.edu/a", 200, END_TO_END_PAGE);
    let mirror = FetchResult::new("https://www.ics.uci.edu/mirror/a", 200, END_TO_END_PAGE);

    let first_links = processor.process_page(&first.url, &first);
    let (mirror_links, outcome) = processor.process_page_with_outcome(&mirror.url, &mirror);

    assert_eq!(first_links.len(), 2);
    assert!(mirror_links.is_empty());
    assert_eq!(outcome, PageOutcome::DuplicateContent);
    assert_eq!(corpus.unique_urls(), 2);
    assert_eq!(corpus.unique_contents(), 1);
    assert_eq!(corpus.total_token_occurrences(), 3);
    assert_eq!(corpus.token_count("hello"), 2);
}

#[test]
fn test_low_information_excluded_from_statistics() {
    let dir = TempDir::new().unwrap();
    let (processor, corpus) = build(&dir);

    // 10 token bytes against ~2000 raw bytes, ratio around 0.005
    let filler = " ".repeat(1915);
    let body = format!(
        "<html><body><p>helloworld</p>{}<a href=\"https://www.ics.uci.edu/next\"></a></body></html>",
        filler
    );
    assert!(body.len() >= 1990 && body.len() <= 2100);

    let response = FetchResult::new("https://www.ics.uci.edu/thin", 200, body);
    let (links, outcome) = processor.process_page_with_outcome(&response.url, &response);

    assert_eq!(outcome, PageOutcome::LowInformation);
    assert_eq!(links, vec!["https://www.ics.uci.edu/next".to_string()]);
    assert_eq!(corpus.unique_tokens(), 0);
    assert_eq!(corpus.longest_page(), None);
}

#[test]
fn test_dedup_monotonicity() {
    let dir = TempDir::new().unwrap();
    let (processor, corpus) = build(&dir);

    let bodies = ["<p>one</p>", "<p>two</p>", "<p>one</p>", "<p>three</p>", "<p>two</p>"];
    let urls = [
        "https://www.ics.uci.edu/1",
        "https://www.ics.uci.edu/2",
        "https://www.ics.uci.edu/3",
        "https://www.ics.uci.edu/1#again",
        "https://www.ics.uci.edu/5",
    ];

    for (n, (url, body)) in urls.iter().zip(bodies.iter()).enumerate() {
        let response = FetchResult::new(*url, 200, *body);
        processor.process_page(url, &response);

        let hashes = corpus.unique_contents();
        let seen = corpus.unique_urls();
        assert!(hashes <= seen, "hashes {} > urls {}", hashes, seen);
        assert!(seen <= n + 1);
    }

    assert_eq!(corpus.unique_urls(), 4);
    assert_eq!(corpus.unique_contents(), 2);
}

#[test]
fn test_fetch_errors_appended() {
    let dir = TempDir::new().unwrap();
    let (processor, corpus) = build(&dir);

    for (code, msg) in [(600, "connection refused"), (607, "too many redirects")] {
        let url = format!("https://www.ics.uci.edu/{}", code);
        let response = FetchResult::fetch_error(url.clone(), code, msg);
        assert!(processor.process_page(&url, &response).is_empty());
    }
    let not_found = FetchResult::new("https://www.ics.uci.edu/404", 404, "");
    assert!(processor.process_page(&not_found.url, &not_found).is_empty());

    let log = std::fs::read_to_string(dir.path().join("errors.log")).unwrap();
    assert_eq!(
        log,
        "status 600 -- connection refused -- https://www.ics.uci.edu/600\n\
         status 607 -- too many redirects -- https://www.ics.uci.edu/607\n"
    );
    assert_eq!(corpus.unique_urls(), 0);
    assert_eq!(processor.metrics().snapshot().fetch_errors, 2);
}

#[test]
fn test_concurrent_duplicate_content_counted_once() {
    let dir = TempDir::new().unwrap();
    let (processor, corpus) = build(&dir);

    std::thread::scope(|s| {
        for i in 0..8 {
            let processor = &processor;
            s.spawn(move || {
                let url = format!("https://www.ics.uci.edu/copy{}", i);
                let response = FetchResult::new(url.clone(), 200, END_TO_END_PAGE);
                processor.process_page(&url, &response)
            });
        }
    });

    assert_eq!(corpus.unique_urls(), 8);
    assert_eq!(corpus.unique_contents(), 1);
    assert_eq!(corpus.token_count("hello"), 2);
    assert_eq!(processor.metrics().snapshot().duplicate_content, 7);
}

#[test]
fn test_report_file() {
    let dir = TempDir::new().unwrap();
    let (processor, corpus) = build(&dir);

    let pages = [
        ("https://vision.ics.uci.edu/a", "<p>robot vision robot</p>"),
        ("https://vision.ics.uci.edu/b", "<p>vision systems</p>"),
        ("https://www.ics.uci.edu/c", "<p>robot</p>"),
        ("https://www.cs.uci.edu/d", "<p>compilers</p>"),
    ];
    for (url, body) in pages {
        processor.process_page(url, &FetchResult::new(url, 200, body));
    }

    let report = corpus.report(2);
    let path = dir.path().join("results.txt");
    write_text_report(&report, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(&lines[..3], &["Top 2 tokens:", "robot 3", "vision 2"]);
    assert!(lines.contains(&"vision.ics.uci.edu 2"));
    assert!(lines.contains(&"ics.uci.edu 1"));
    assert!(!lines.contains(&"cs.uci.edu 1"));
    assert!(lines.contains(&"unique_tokens 4"));
    assert!(lines.contains(&"longest_page https://vision.ics.uci.edu/a 3"));
    assert!(lines.contains(&"unique_urls 4"));
}
