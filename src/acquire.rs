//! Getting recipe text in front of the import pipeline: URL checks, page
//! fetching, and the minimum-length gate for pasted text.

use crate::error::IngestError;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;

/// Pasted text shorter than this (after trimming) is rejected
pub const MIN_IMPORT_TEXT_CHARS: usize = 50;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Elements whose text never reaches the reader
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

/// True for absolute `http://` and `https://` URLs with a host
pub fn is_valid_url(text: &str) -> bool {
    match reqwest::Url::parse(text.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Reject blank text, or text too short to hold a recipe
pub fn validate_source_text(text: &str, min_chars: usize) -> Result<(), IngestError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(IngestError::InvalidInput(
            "Please paste the recipe text to import".to_string(),
        ));
    }
    if trimmed.chars().count() < min_chars {
        return Err(IngestError::InvalidInput(
            "Please paste more of the recipe including ingredients and instructions".to_string(),
        ));
    }
    Ok(())
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, IngestError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| IngestError::Builder(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<String, IngestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::Acquisition(format!("Could not reach {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Acquisition(format!(
                "{url} returned {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| IngestError::Acquisition(format!("Could not read {url}: {e}")))
    }
}

/// Fetch `url` and return the visible text of its page
pub async fn fetch_url_text(url: &str, timeout: Option<Duration>) -> Result<String, IngestError> {
    let html = PageFetcher::new(timeout)?.fetch(url).await?;
    let text = html_to_text(&html);
    debug!("Fetched {} bytes of HTML, {} chars of text from {}", html.len(), text.len(), url);

    if text.is_empty() {
        return Err(IngestError::Acquisition(format!(
            "No readable text found at {url}"
        )));
    }
    Ok(text)
}

/// Reduce an HTML document to its visible text, one block per line.
///
/// Scripts, styles and elements marked `hidden` or `aria-hidden` are dropped.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut lines = Vec::new();
    let mut current = String::new();
    collect_text(root, &mut current, &mut lines);
    flush_line(&mut current, &mut lines);
    lines.join("\n")
}

fn collect_text(element: ElementRef, current: &mut String, lines: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                for word in text.split_whitespace() {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                }
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name)
                    || el.attr("hidden").is_some()
                    || el.attr("aria-hidden") == Some("true")
                {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    let block = is_block(name);
                    if block {
                        flush_line(current, lines);
                    }
                    collect_text(child_ref, current, lines);
                    if block {
                        flush_line(current, lines);
                    }
                }
            }
            _ => {}
        }
    }
}

fn flush_line(current: &mut String, lines: &mut Vec<String>) {
    let line = current.trim();
    if !line.is_empty() {
        lines.push(line.to_string());
    }
    current.clear();
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "li"
            | "ul"
            | "ol"
            | "br"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "tr"
            | "table"
            | "blockquote"
    )
}
