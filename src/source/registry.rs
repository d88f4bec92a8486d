//! Adapter registry keyed by adapter identifier

use crate::source::html_scrape::HtmlScrapeAdapter;
use crate::source::official_api::OfficialApiAdapter;
use crate::source::SourceAdapter;
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps adapter identifiers from the configuration to adapter instances
///
/// Sources pick their adapter by identifier, so adding a carrier or
/// reordering its sources is a configuration change only.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in adapters, all sharing `client`
    pub fn with_builtins(client: Client) -> Self {
        let mut registry = Self::new();
        registry.register(
            "official-api",
            Arc::new(OfficialApiAdapter::new(client.clone())),
        );
        registry.register(
            "statuspage",
            Arc::new(OfficialApiAdapter::statuspage(client.clone())),
        );
        registry.register("html-scrape", Arc::new(HtmlScrapeAdapter::new(client)));
        registry
    }

    /// Registers an adapter, returning the one it replaced
    pub fn register(
        &mut self,
        id: impl Into<String>,
        adapter: Arc<dyn SourceAdapter>,
    ) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.insert(id.into(), adapter)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.adapters.contains_key(id)
    }

    /// Registered identifiers, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.ids())
            .finish()
    }
}
