use crate::error::{DocsumoError, Result};
use reqwest::blocking::{Client, ClientBuilder};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "DOCSUMO_API_KEY";

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://app.docsumo.com";

/// Default API version path segment
pub const DEFAULT_VERSION: &str = "v1";

/// Create the HTTP client for API requests.
/// Uploads go through the same client, so the overall timeout is generous.
pub fn create_http_client() -> Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(600)) // 10 minutes
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(DocsumoError::from)
}

/// Configuration for the Docsumo API client
#[derive(Clone)]
pub struct Config {
    /// API key sent in the `apikey` header
    pub api_key: String,
    /// Base URL of the API, without the `/api` suffix
    pub base_url: String,
    /// API version (`v1`)
    pub version: String,
}

impl Config {
    /// Create a new configuration with the given API key and default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Config {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }

    /// Create a configuration from `DOCSUMO_API_KEY`
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Config::new(key)),
            _ => Err(DocsumoError::NoApiKey),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the API version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Full URL of an `eevee/apikey` endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/{}/eevee/apikey/{}",
            self.base_url.trim_end_matches('/'),
            self.version,
            path.trim_start_matches('/')
        )
    }

    /// Authentication headers shared by every request
    pub fn auth_headers(&self) -> Vec<(String, String)> {
        vec![("apikey".to_string(), self.api_key.clone())]
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .finish()
    }
}
