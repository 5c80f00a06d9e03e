//! # Client Configuration
//!
//! Configuration for the storefront client. Loaded from
//! `config/storefront.toml` when present, otherwise from environment
//! variables (a `.env` file is honoured).

use serde::Deserialize;
use shop_core::ShopError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHECKOUT_URL: &str = "https://checkout.stripe.com/pay/{session_id}";

/// Storefront client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://api.example.com/api`
    pub api_base_url: String,

    /// Directory holding the cached profile snapshot
    #[serde(default = "default_profile_dir")]
    pub profile_dir: PathBuf,

    /// Hosted checkout URL; `{session_id}` is replaced by the payment session
    #[serde(default = "default_checkout_url")]
    pub checkout_url_template: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_profile_dir() -> PathBuf {
    PathBuf::from(".storefront")
}

fn default_checkout_url() -> String {
    DEFAULT_CHECKOUT_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Create config with explicit base URL and defaults for everything else
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            profile_dir: default_profile_dir(),
            checkout_url_template: default_checkout_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from the first config file found, falling back to the environment.
    pub fn load() -> Result<Self, ShopError> {
        let config_paths = [
            "config/storefront.toml",
            "../config/storefront.toml",
            "../../config/storefront.toml",
        ];

        for path in config_paths {
            if let Ok(content) = std::fs::read_to_string(path) {
                let config = Self::from_toml(&content)
                    .map_err(|e| ShopError::Configuration(format!("{}: {}", path, e)))?;
                tracing::info!("Loaded client config from {}", path);
                return Ok(config);
            }
        }

        Self::from_env()
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ShopError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ShopError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STOREFRONT_API_URL`
    ///
    /// Optional:
    /// - `STOREFRONT_PROFILE_DIR`
    /// - `STOREFRONT_CHECKOUT_URL`
    /// - `STOREFRONT_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ShopError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("STOREFRONT_API_URL").map_err(|_| {
            ShopError::Configuration("STOREFRONT_API_URL not set".to_string())
        })?;

        let mut config = Self::new(api_base_url);

        if let Ok(dir) = env::var("STOREFRONT_PROFILE_DIR") {
            config.profile_dir = PathBuf::from(dir);
        }
        if let Ok(template) = env::var("STOREFRONT_CHECKOUT_URL") {
            config.checkout_url_template = template;
        }
        if let Ok(secs) = env::var("STOREFRONT_TIMEOUT_SECS") {
            config.timeout_secs = secs.parse().map_err(|_| {
                ShopError::Configuration(format!("STOREFRONT_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the client cannot work with
    pub fn validate(&self) -> Result<(), ShopError> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ShopError::Configuration(
                "api_base_url must start with http:// or https://".to_string(),
            ));
        }

        if !self.checkout_url_template.contains("{session_id}") {
            return Err(ShopError::Configuration(
                "checkout_url_template must contain {session_id}".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ShopError::Configuration(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builder: set profile directory
    pub fn with_profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_dir = dir.into();
        self
    }

    /// Builder: set hosted checkout URL template
    pub fn with_checkout_url(mut self, template: impl Into<String>) -> Self {
        self.checkout_url_template = template.into();
        self
    }
}
