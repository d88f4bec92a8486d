use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Characters left as-is when a region is substituted into a URL: the RFC 3986
/// unreserved set, which is safe in both paths and query strings
const REGION_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Placeholder substituted with the region identifier in source URL templates
pub const REGION_PLACEHOLDER: &str = "{region}";

/// Main configuration structure for Outage Watch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "carrier")]
    pub carriers: Vec<CarrierSpec>,
}

/// Aggregation engine behavior
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of carrier/region resolutions in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Default per-source timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_concurrency() -> u32 {
    4
}

fn default_timeout_secs() -> u64 {
    20
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    pub name: String,
    pub version: String,

    #[serde(rename = "contact-url")]
    pub contact_url: String,

    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.name, self.version, self.contact_url, self.contact_email
        )
    }
}

/// Where the report sinks write
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(rename = "json-path", default = "default_json_path")]
    pub json_path: String,

    #[serde(rename = "html-path", default = "default_html_path")]
    pub html_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: default_json_path(),
            html_path: default_html_path(),
        }
    }
}

fn default_json_path() -> String {
    "us_outages.json".to_string()
}

fn default_html_path() -> String {
    "us_outages.html".to_string()
}

/// Static identity of one tracked carrier
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CarrierSpec {
    /// Unique carrier name
    pub name: String,

    /// Whether status queries for this carrier take a region (e.g. ZIP code)
    #[serde(default)]
    pub regional: bool,

    /// Regions evaluated when no region list is supplied for the run
    #[serde(default)]
    pub regions: Vec<String>,

    /// Sources in priority order (first is tried first)
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceDescriptor>,
}

impl CarrierSpec {
    /// Creates a carrier without a region dimension
    pub fn new(name: impl Into<String>, sources: Vec<SourceDescriptor>) -> Self {
        Self {
            name: name.into(),
            regional: false,
            regions: Vec::new(),
            sources,
        }
    }

    /// Marks the carrier as regional with the given default regions
    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regional = true;
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Regions to resolve for this carrier in one run
    ///
    /// Non-regional carriers always resolve exactly once with no region.
    /// Regional carriers use the run's region list when one is supplied,
    /// otherwise their configured defaults, otherwise a single unqualified
    /// query. Repeated regions are resolved once, at their first position.
    pub fn regions_for_run(&self, supplied: &[String]) -> Vec<Option<String>> {
        if !self.regional {
            return vec![None];
        }

        let regions = if supplied.is_empty() {
            &self.regions
        } else {
            supplied
        };

        if regions.is_empty() {
            vec![None]
        } else {
            let mut seen = HashSet::new();
            regions
                .iter()
                .filter(|region| seen.insert(region.as_str()))
                .cloned()
                .map(Some)
                .collect()
        }
    }
}

/// Kind of endpoint a source points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    OfficialApi,
    HtmlScrape,
}

impl SourceKind {
    /// Adapter used when a source does not name one
    pub fn default_adapter(&self) -> &'static str {
        match self {
            Self::OfficialApi => "official-api",
            Self::HtmlScrape => "html-scrape",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OfficialApi => write!(f, "official-api"),
            Self::HtmlScrape => write!(f, "html-scrape"),
        }
    }
}

/// One fetchable endpoint of a carrier
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceDescriptor {
    pub kind: SourceKind,

    /// URL template, may contain `{region}`
    pub url: String,

    /// Adapter identifier; defaults to the kind's adapter
    #[serde(default)]
    pub adapter: Option<String>,

    /// CSS selector for html-scrape sources
    #[serde(default)]
    pub selector: Option<String>,

    /// JSON pointer to the summary text for official-api sources
    #[serde(default, rename = "summary-pointer")]
    pub summary_pointer: Option<String>,

    /// Overrides the engine's default timeout for this source
    #[serde(default, rename = "timeout-secs")]
    pub timeout_secs: Option<u64>,
}

impl SourceDescriptor {
    pub fn new(kind: SourceKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            adapter: None,
            selector: None,
            summary_pointer: None,
            timeout_secs: None,
        }
    }

    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_summary_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.summary_pointer = Some(pointer.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// The adapter identifier this source resolves to
    pub fn adapter_id(&self) -> &str {
        self.adapter
            .as_deref()
            .unwrap_or_else(|| self.kind.default_adapter())
    }

    /// Whether the URL template contains the region placeholder
    pub fn is_region_templated(&self) -> bool {
        self.url.contains(REGION_PLACEHOLDER)
    }

    /// Renders the URL template for a region
    ///
    /// The region is percent-encoded; without a region the placeholder is
    /// dropped.
    pub fn address_for(&self, region: Option<&str>) -> String {
        if !self.is_region_templated() {
            return self.url.clone();
        }

        let encoded = region
            .map(|r| utf8_percent_encode(r, REGION_ENCODE_SET).to_string())
            .unwrap_or_default();
        self.url.replace(REGION_PLACEHOLDER, &encoded)
    }
}
