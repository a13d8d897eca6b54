//! Settings structures for GymSpot configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main settings structure, loaded from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub outgoing: OutgoingSettings,
    pub search: SearchSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (GYMSPOT_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("GYMSPOT_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = var("GYMSPOT_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("GYMSPOT_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("GYMSPOT_BASE_URL") {
            self.server.base_url = Some(val);
        }
        if let Some(val) = var("GYMSPOT_STORE_URL") {
            self.store.url = val;
        }
        if let Some(val) = var("GYMSPOT_STORE_API_KEY") {
            self.store.api_key = Some(val);
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name displayed in UI
    pub instance_name: String,
    /// Expose the /stats endpoint
    pub enable_metrics: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "GymSpot".to_string(),
            enable_metrics: true,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub bind_address: String,
    /// Public base URL for the instance
    pub base_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "127.0.0.1".to_string(),
            base_url: None,
        }
    }
}

/// Which listing store implementation to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Hosted PostgREST/Supabase endpoint
    #[default]
    Postgrest,
    /// Rows loaded from a fixture file
    Memory,
}

/// Listing store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// REST base URL, e.g. https://<project>.supabase.co/rest/v1
    pub url: String,
    /// Anonymous API key sent as `apikey` and bearer token
    pub api_key: Option<String>,
    /// Listings table name
    pub table: String,
    /// Fixture file for the memory backend
    pub fixture: Option<PathBuf>,
    /// Push facility matching into the store query when the store supports it
    pub server_side_facilities: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: "http://127.0.0.1:54321/rest/v1".to_string(),
            api_key: None,
            table: "gyms".to_string(),
            fixture: None,
            server_side_facilities: false,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Idle connections kept per host
    pub pool_maxsize: usize,
    /// Verify TLS certificates
    pub verify_ssl: bool,
    pub proxies: ProxySettings,
    /// Extra headers sent with every request
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 5.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Lower end of the price slider
    pub price_floor: f64,
    /// Upper end of the price slider
    pub price_ceiling: f64,
    /// Minimum-rating slider step
    pub rating_step: f64,
    /// Number of gyms shown on the home page
    pub featured_limit: usize,
    /// Facility checkboxes offered in the filter panel
    pub facilities: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            price_floor: crate::search::PRICE_FLOOR,
            price_ceiling: crate::search::PRICE_CEILING,
            rating_step: crate::search::RATING_STEP,
            featured_limit: 6,
            facilities: crate::facilities::default_vocabulary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert!(!settings.general.debug);
        assert_eq!(settings.store.backend, StoreBackend::Postgrest);
        assert_eq!(settings.store.table, "gyms");
        assert_eq!(settings.search.featured_limit, 6);
        assert_eq!(settings.search.facilities.len(), 14);
    }

    #[test]
    fn test_partial_yaml() {
        let settings = Settings::from_yaml(
            "general:\n  instance_name: Pune Gyms\nstore:\n  backend: memory\n  fixture: fixtures/gyms.yml\n",
        )
        .unwrap();

        assert_eq!(settings.general.instance_name, "Pune Gyms");
        assert!(settings.general.enable_metrics);
        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.store.fixture, Some(PathBuf::from("fixtures/gyms.yml")));
        assert_eq!(settings.search.price_ceiling, 2000.0);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GYMSPOT_DEBUG", "true"),
            ("GYMSPOT_PORT", "not-a-port"),
            ("GYMSPOT_STORE_URL", "https://abc.supabase.co/rest/v1"),
            ("GYMSPOT_STORE_API_KEY", "anon"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.merge_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert!(settings.general.debug);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.store.url, "https://abc.supabase.co/rest/v1");
        assert_eq!(settings.store.api_key.as_deref(), Some("anon"));
    }
}
