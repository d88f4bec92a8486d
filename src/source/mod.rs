//! Source adapters for carrier status endpoints
//!
//! This module contains everything that talks to the outside world:
//! - The `SourceAdapter` trait and the `FetchOutcome` failure taxonomy
//! - The shared HTTP fetcher and error classification
//! - Built-in adapters for JSON status APIs and scraped HTML pages
//! - The registry that maps configured adapter identifiers to adapters

mod fetcher;
mod html_scrape;
mod official_api;
mod registry;
mod traits;

pub use fetcher::{build_http_client, classify_error, fetch_text, FetchedBody};
pub use html_scrape::{parse_status_page, HtmlScrapeAdapter, DEFAULT_SELECTOR};
pub use official_api::{
    parse_status_document, OfficialApiAdapter, DEFAULT_SUMMARY_POINTER,
    STATUSPAGE_SUMMARY_POINTER,
};
pub use registry::AdapterRegistry;
pub use traits::{FailureKind, FetchOutcome, SourceAdapter};
