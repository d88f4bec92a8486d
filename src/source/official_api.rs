//! Adapter for carrier status APIs that answer with JSON
//!
//! The summary is located with a JSON pointer. A 200 response whose payload
//! is empty or a placeholder (`null`, `{}`, `[]`, blank summary field) is
//! reported as a parse failure, so the chain moves on to the next source.

use crate::config::SourceDescriptor;
use crate::source::fetcher::{fetch_text, FetchedBody};
use crate::source::{FetchOutcome, SourceAdapter};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Summary pointer for generic official APIs
pub const DEFAULT_SUMMARY_POINTER: &str = "/summary";

/// Summary pointer for Atlassian Statuspage `status.json` documents
pub const STATUSPAGE_SUMMARY_POINTER: &str = "/status/description";

/// Fetches a JSON status document and extracts its summary
pub struct OfficialApiAdapter {
    client: Client,
    name: &'static str,
    default_pointer: &'static str,
}

impl OfficialApiAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            name: "official-api",
            default_pointer: DEFAULT_SUMMARY_POINTER,
        }
    }

    /// Variant preconfigured for Statuspage-hosted status APIs
    pub fn statuspage(client: Client) -> Self {
        Self {
            client,
            name: "statuspage",
            default_pointer: STATUSPAGE_SUMMARY_POINTER,
        }
    }
}

#[async_trait]
impl SourceAdapter for OfficialApiAdapter {
    async fn fetch(&self, source: &SourceDescriptor, region: Option<&str>) -> FetchOutcome {
        let address = source.address_for(region);
        let fetched = match fetch_text(&self.client, &address).await {
            Ok(fetched) => fetched,
            Err(failure) => return failure,
        };

        let pointer = source
            .summary_pointer
            .as_deref()
            .unwrap_or(self.default_pointer);
        parse_status_document(&fetched, pointer)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Normalizes a JSON status document into an outcome
pub fn parse_status_document(fetched: &FetchedBody, pointer: &str) -> FetchOutcome {
    let body = fetched.body.trim();
    if body.is_empty() {
        return FetchOutcome::no_data("empty response body");
    }

    let document: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return FetchOutcome::no_data(format!("response is not valid JSON ({})", e)),
    };

    if is_placeholder(&document) {
        return FetchOutcome::no_data("placeholder payload");
    }

    let summary = match document.pointer(pointer) {
        None => return FetchOutcome::no_data(format!("field '{}' missing", pointer)),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(_) => return FetchOutcome::no_data(format!("field '{}' holds no text", pointer)),
    };

    let detail = serde_json::json!({
        "url": fetched.final_url,
        "status_code": fetched.status_code,
        "content_type": fetched.content_type,
        "document": document,
    });

    FetchOutcome::success(summary, detail)
}

fn is_placeholder(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
