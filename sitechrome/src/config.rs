//! Configuration for the chrome pipeline.
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `SITECHROME_` prefix, `__` for
//!    nesting)
//! 2. A TOML file (`./chrome.toml` by default)
//! 3. Hardcoded defaults (fallback)
//!
//! Environment variable format: `SITECHROME_SECTION__FIELD_NAME`
//! - Use `__` (double underscore) to separate nested sections
//! - Use `_` (single underscore) within field names
//! - Example: `SITECHROME_BLOCKS__TIMEOUT_MS=3000`
//!
//! # Example Configuration
//!
//! ```toml
//! # chrome.toml
//! [site]
//! host_url = "https://www.example.org"
//! proxy_prefix = "/campus"
//! default_locale = "sv"
//!
//! [blocks]
//! remote_url = "https://cms.example.org/fragments/"
//! names = ["header", "footer"]
//!
//! [blocks.cache]
//! url = "redis://127.0.0.1:6379"
//! ttl_secs = 600
//!
//! [assets]
//! version = "1.2.3"
//! ```
//!
//! Loading fails fast: a malformed URL or an empty fragment list is reported
//! at startup, never discovered mid-request.

use std::collections::HashMap;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ChromeError;
use crate::locale::Locale;

/// Site identity and mounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Public scheme-and-host of the application, e.g. `https://www.example.org`.
    pub host_url: String,

    /// Path prefix the application is mounted under behind a reverse proxy
    /// (empty when mounted at the root).
    pub proxy_prefix: String,

    /// Locale used when a request carries no usable language signal.
    pub default_locale: Locale,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            host_url: "http://localhost:3000".to_owned(),
            proxy_prefix: String::new(),
            default_locale: Locale::Sv,
        }
    }
}

/// Remote fragment service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockApiSettings {
    /// Base URL fragments are fetched from; block names are appended, so it
    /// must end with `/`.
    pub remote_url: String,

    /// Block names fetched for every page.
    pub names: Vec<String>,

    /// Additional block names appended to the standard set.
    pub extra_names: Vec<String>,

    /// Per-request timeout for a single fetch attempt, in milliseconds.
    pub timeout_ms: u64,

    /// Extra headers sent with every fragment request (API keys and the like).
    pub headers: HashMap<String, String>,

    /// Fragment cache settings.
    pub cache: CacheSettings,
}

impl Default for BlockApiSettings {
    fn default() -> Self {
        Self {
            remote_url: "http://localhost:8080/blocks/".to_owned(),
            names: vec!["header".to_owned(), "footer".to_owned()],
            extra_names: Vec::new(),
            timeout_ms: 5000,
            headers: HashMap::new(),
            cache: CacheSettings::default(),
        }
    }
}

impl BlockApiSettings {
    /// All block names to fetch, standard set first.
    #[must_use]
    pub fn all_names(&self) -> Vec<String> {
        let mut names = self.names.clone();
        names.extend(self.extra_names.iter().cloned());
        names
    }
}

/// Fragment cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Whether fetched fragments are cached at all.
    pub enabled: bool,

    /// Redis connection URL.
    pub url: String,

    /// Key prefix separating this application's fragments from others
    /// sharing the instance.
    pub key_prefix: String,

    /// How long a cached fragment payload stays valid, in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "redis://127.0.0.1:6379".to_owned(),
            key_prefix: "blocks".to_owned(),
            ttl_secs: 600,
        }
    }
}

/// Static asset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Version string appended to asset URLs for cache busting.
    pub version: String,

    /// Request paths under this prefix are static assets and skip the chrome
    /// pipeline entirely.
    pub static_prefix: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            version: "dev".to_owned(),
            static_prefix: "/static/".to_owned(),
        }
    }
}

/// Crawler redirect settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Substring identifying crawler user agents (matched case-insensitively).
    pub user_agent_marker: String,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            user_agent_marker: "gsa-crawler".to_owned(),
        }
    }
}

/// Complete chrome pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    /// Site identity and mounting.
    pub site: SiteSettings,

    /// Remote fragment service.
    pub blocks: BlockApiSettings,

    /// Static asset handling.
    pub assets: AssetSettings,

    /// Crawler redirect behaviour.
    pub crawler: CrawlerSettings,
}

impl ChromeConfig {
    /// Load configuration from `./chrome.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed, a value fails type
    /// conversion, or the merged configuration fails [`Self::validate`].
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("./chrome.toml")
    }

    /// Load configuration from a specific file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed, a value fails type
    /// conversion, or the merged configuration fails [`Self::validate`].
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use sitechrome::config::ChromeConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ChromeConfig::load_from("./config/production.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config: Self = Figment::new()
            // Start with defaults
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            // Load from specified file (if it exists)
            .merge(Toml::file(path))
            // Environment variables override everything
            .merge(Env::prefixed("SITECHROME_").split("__").lowercase(true))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for authoring mistakes.
    ///
    /// # Errors
    ///
    /// Returns a [`ChromeError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ChromeError> {
        url::Url::parse(&self.site.host_url)?;
        url::Url::parse(&self.blocks.remote_url)?;
        if !self.blocks.remote_url.ends_with('/') {
            return Err(ChromeError::Config(
                "blocks.remote_url must end with '/' so block names can be appended".to_owned(),
            ));
        }
        if self.blocks.names.is_empty() && self.blocks.extra_names.is_empty() {
            return Err(ChromeError::Config(
                "blocks.names must name at least one fragment".to_owned(),
            ));
        }
        if self.blocks.timeout_ms == 0 {
            return Err(ChromeError::Config(
                "blocks.timeout_ms must be greater than zero".to_owned(),
            ));
        }
        if !self.site.proxy_prefix.is_empty()
            && (!self.site.proxy_prefix.starts_with('/') || self.site.proxy_prefix.ends_with('/'))
        {
            return Err(ChromeError::Config(
                "site.proxy_prefix must start with '/' and carry no trailing '/'".to_owned(),
            ));
        }
        if !self.assets.static_prefix.starts_with('/') {
            return Err(ChromeError::Config(
                "assets.static_prefix must start with '/'".to_owned(),
            ));
        }
        if self.blocks.cache.enabled {
            url::Url::parse(&self.blocks.cache.url)?;
        }
        Ok(())
    }

    /// Public base URL of the application: host plus proxy prefix, with no
    /// trailing slash.
    #[must_use]
    pub fn app_base_url(&self) -> String {
        format!(
            "{}{}",
            self.site.host_url.trim_end_matches('/'),
            self.site.proxy_prefix
        )
    }
}
