//! Adapter for HTML status pages and third-party mirror sites
//!
//! The summary is the whitespace-normalized text of the first element that
//! matches the source's CSS selector. Status pages are redesigned without
//! notice, so a missing element degrades to a "no data found" parse failure
//! rather than an error.

use crate::config::SourceDescriptor;
use crate::source::fetcher::{fetch_text, FetchedBody};
use crate::source::{FetchOutcome, SourceAdapter};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

/// Selector used when a source does not set one (downdetector's summary block)
pub const DEFAULT_SELECTOR: &str = "div.entry-content";

/// Scrapes a status summary out of an HTML page
pub struct HtmlScrapeAdapter {
    client: Client,
}

impl HtmlScrapeAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for HtmlScrapeAdapter {
    async fn fetch(&self, source: &SourceDescriptor, region: Option<&str>) -> FetchOutcome {
        let address = source.address_for(region);
        let fetched = match fetch_text(&self.client, &address).await {
            Ok(fetched) => fetched,
            Err(failure) => return failure,
        };

        let selector = source.selector.as_deref().unwrap_or(DEFAULT_SELECTOR);
        parse_status_page(&fetched, selector)
    }

    fn name(&self) -> &'static str {
        "html-scrape"
    }
}

/// Extracts the summary text from a fetched page
///
/// # Example
///
/// ```
/// use outage_watch::source::{parse_status_page, FetchedBody};
///
/// let page = FetchedBody {
///     final_url: "https://example.com/status".to_string(),
///     status_code: 200,
///     content_type: Some("text/html".to_string()),
///     body: r#"<div class="entry-content"><p>No current problems</p></div>"#.to_string(),
/// };
/// let outcome = parse_status_page(&page, "div.entry-content");
/// assert_eq!(outcome.text(), "No current problems");
/// ```
pub fn parse_status_page(fetched: &FetchedBody, selector: &str) -> FetchOutcome {
    let parsed_selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(e) => {
            return FetchOutcome::no_data(format!("invalid selector '{}': {:?}", selector, e))
        }
    };

    let document = Html::parse_document(&fetched.body);
    let mut matches = document.select(&parsed_selector);

    let element = match matches.next() {
        Some(element) => element,
        None => return FetchOutcome::no_data(format!("no element matches '{}'", selector)),
    };

    let summary = element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if summary.is_empty() {
        return FetchOutcome::no_data(format!("element '{}' has no text", selector));
    }

    let match_count = 1 + matches.count();
    let detail = serde_json::json!({
        "url": fetched.final_url,
        "status_code": fetched.status_code,
        "content_type": fetched.content_type,
        "selector": selector,
        "matches": match_count,
    });

    FetchOutcome::success(summary, detail)
}
