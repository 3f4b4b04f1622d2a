use scraper::{ElementRef, Html};

/// Parents whose text never reaches a reader.
const INVISIBLE_PARENTS: &[&str] = &["style", "script", "head", "title", "meta"];

/// Decode a fetched body as UTF-8.
///
/// Returns `None` when the decoded text carries replacement characters, which
/// means the bytes were binary or mis-encoded and any text would be garbage.
pub fn decode_body(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    if text.contains(char::REPLACEMENT_CHARACTER) {
        None
    } else {
        Some(text.into_owned())
    }
}

/// Parsed page ready for text and link extraction.
pub struct ParsedPage {
    document: Html,
}

impl ParsedPage {
    pub fn parse(html_body: &str) -> Self {
        Self {
            document: Html::parse_document(html_body),
        }
    }

    /// Visible text in document order, one space between trimmed fragments.
    ///
    /// Comments are separate node kinds and never show up as text. Text hanging
    /// directly off the document root is skipped as well.
    pub fn visible_text(&self) -> String {
        let mut fragments = Vec::new();

        for node in self.document.tree.root().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };

            let visible = node
                .parent()
                .and_then(|parent| {
                    parent
                        .value()
                        .as_element()
                        .map(|el| !INVISIBLE_PARENTS.contains(&el.name()))
                })
                .unwrap_or(false);
            if !visible {
                continue;
            }

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                fragments.push(trimmed);
            }
        }

        fragments.join(" ")
    }

    /// `href` values of every anchor that look absolute (contain `http`).
    ///
    /// Relative, `mailto:` and `javascript:` links are dropped rather than
    /// resolved against the page URL.
    pub fn links(&self) -> Vec<String> {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "a")
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| href.contains("http"))
            .map(str::to_string)
            .collect()
    }
}

/// Extract the absolute-looking hyperlinks from HTML content
///
/// # Examples
/// ```
/// use rust_scraper::parser::extract_links;
///
/// let html = r#"<html><body><a href="https://example.com">Link</a><a href="/about">About</a></body></html>"#;
/// let links = extract_links(html);
/// assert_eq!(links, vec!["https://example.com"]);
/// ```
pub fn extract_links(html_body: &str) -> Vec<String> {
    ParsedPage::parse(html_body).links()
}

/// Extract reader-visible text from HTML content.
pub fn extract_visible_text(html_body: &str) -> String {
    ParsedPage::parse(html_body).visible_text()
}
