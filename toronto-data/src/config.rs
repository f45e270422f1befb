use std::sync::Arc;
use std::time::Duration;
use toronto_ckan::Configuration as CkanConfiguration;

/// Environment variable overriding the catalog base address
pub const BASE_URL_ENV: &str = "TORONTO_OPEN_DATA_BASE_URL";
/// Environment variable overriding the HTTP user agent
pub const USER_AGENT_ENV: &str = "TORONTO_OPEN_DATA_USER_AGENT";

/// Configuration for the Toronto data client
#[derive(Debug, Clone)]
pub struct TorontoDataConfig {
    /// CKAN client configuration
    pub ckan_config: Arc<CkanConfiguration>,
    /// User agent for HTTP requests
    pub user_agent: String,
    /// Bounded wait for file fetches, in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for TorontoDataConfig {
    fn default() -> Self {
        let user_agent = concat!("toronto-data/", env!("CARGO_PKG_VERSION")).to_string();
        let ckan_config = CkanConfiguration {
            user_agent: Some(user_agent.clone()),
            ..CkanConfiguration::default()
        };
        Self {
            ckan_config: Arc::new(ckan_config),
            user_agent,
            fetch_timeout_secs: 10,
        }
    }
}

impl TorontoDataConfig {
    /// Create a new configuration for the Toronto portal
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with the base URL and user agent taken from
    /// the environment when set
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        if let Ok(user_agent) = std::env::var(USER_AGENT_ENV) {
            config = config.with_user_agent(user_agent);
        }
        config
    }

    /// Use another CKAN action API base, e.g. `http://localhost:5000/api/3`
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        let mut ckan_config = (*self.ckan_config).clone();
        ckan_config.base_path = base_url.into();
        self.ckan_config = Arc::new(ckan_config);
        self
    }

    /// Set custom user agent
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        let mut ckan_config = (*self.ckan_config).clone();
        ckan_config.user_agent = Some(self.user_agent.clone());
        self.ckan_config = Arc::new(ckan_config);
        self
    }

    /// Set the file fetch timeout
    pub fn with_fetch_timeout(mut self, timeout_secs: u64) -> Self {
        self.fetch_timeout_secs = timeout_secs;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.ckan_config.base_path
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
