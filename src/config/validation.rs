use crate::config::types::{
    CarrierSpec, Config, EngineConfig, OutputConfig, SourceDescriptor, SourceKind,
    UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Adapter identifiers known to the built-in registry, with the source kind
/// each one serves
pub const BUILTIN_ADAPTERS: &[(&str, SourceKind)] = &[
    ("official-api", SourceKind::OfficialApi),
    ("statuspage", SourceKind::OfficialApi),
    ("html-scrape", SourceKind::HtmlScrape),
];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_carriers(&config.carriers)?;
    Ok(())
}

/// Validates engine configuration
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    validate_timeout(config.timeout_secs, "timeout-secs")
}

fn validate_timeout(secs: u64, what: &str) -> Result<(), ConfigError> {
    if secs < 1 || secs > 120 {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and 120 seconds, got {}",
            what, secs
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.is_empty() {
        return Err(ConfigError::Validation(
            "json-path cannot be empty".to_string(),
        ));
    }

    if config.html_path.is_empty() {
        return Err(ConfigError::Validation(
            "html-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the carrier table
fn validate_carriers(carriers: &[CarrierSpec]) -> Result<(), ConfigError> {
    if carriers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[carrier]] must be configured".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for carrier in carriers {
        if carrier.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "carrier name cannot be empty".to_string(),
            ));
        }

        if !names.insert(carrier.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate carrier name '{}'",
                carrier.name
            )));
        }

        validate_carrier(carrier)?;
    }

    Ok(())
}

fn validate_carrier(carrier: &CarrierSpec) -> Result<(), ConfigError> {
    if carrier.sources.is_empty() {
        return Err(ConfigError::Validation(format!(
            "carrier '{}' must have at least one source",
            carrier.name
        )));
    }

    if !carrier.regional && !carrier.regions.is_empty() {
        return Err(ConfigError::Validation(format!(
            "carrier '{}' lists regions but is not marked regional",
            carrier.name
        )));
    }

    let mut seen = HashSet::new();
    for region in &carrier.regions {
        validate_region(region)?;
        if !seen.insert(region.as_str()) {
            return Err(ConfigError::Validation(format!(
                "carrier '{}' lists region '{}' more than once",
                carrier.name, region
            )));
        }
    }

    for source in &carrier.sources {
        validate_source(carrier, source)?;
    }

    Ok(())
}

/// Validates a region identifier (e.g. a ZIP code)
pub fn validate_region(region: &str) -> Result<(), ConfigError> {
    if region.trim().is_empty() {
        return Err(ConfigError::Validation(
            "region identifier cannot be empty".to_string(),
        ));
    }
    if region.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "region identifier '{}' cannot contain whitespace",
            region
        )));
    }
    Ok(())
}

fn validate_source(carrier: &CarrierSpec, source: &SourceDescriptor) -> Result<(), ConfigError> {
    if source.is_region_templated() && !carrier.regional {
        return Err(ConfigError::Validation(format!(
            "source '{}' of carrier '{}' uses {{region}} but the carrier is not regional",
            source.url, carrier.name
        )));
    }

    // Substitute a representative region so templated URLs can be parsed
    let rendered = source.address_for(Some("00000"));
    let url = Url::parse(&rendered).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid source URL '{}': {}", source.url, e))
    })?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "source URL '{}' must use http or https",
            source.url
        )));
    }

    let adapter = source.adapter_id();
    let kind = BUILTIN_ADAPTERS
        .iter()
        .find(|(id, _)| *id == adapter)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| {
            ConfigError::Validation(format!(
                "unknown adapter '{}' for carrier '{}'",
                adapter, carrier.name
            ))
        })?;

    if kind != source.kind {
        return Err(ConfigError::Validation(format!(
            "adapter '{}' serves {} sources, but '{}' is declared {}",
            adapter, kind, source.url, source.kind
        )));
    }

    if let Some(secs) = source.timeout_secs {
        validate_timeout(secs, "source timeout-secs")?;
    }

    match source.kind {
        SourceKind::HtmlScrape => {
            if source.summary_pointer.is_some() {
                return Err(ConfigError::Validation(format!(
                    "summary-pointer only applies to official-api sources ('{}')",
                    source.url
                )));
            }
            if let Some(selector) = &source.selector {
                Selector::parse(selector).map_err(|e| {
                    ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e))
                })?;
            }
        }
        SourceKind::OfficialApi => {
            if source.selector.is_some() {
                return Err(ConfigError::Validation(format!(
                    "selector only applies to html-scrape sources ('{}')",
                    source.url
                )));
            }
            if let Some(pointer) = &source.summary_pointer {
                if !pointer.is_empty() && !pointer.starts_with('/') {
                    return Err(ConfigError::Validation(format!(
                        "summary-pointer '{}' must be empty or start with '/'",
                        pointer
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact-email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
