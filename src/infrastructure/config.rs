//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. An optional TOML/JSON/YAML file
//! 3. `PROFILE_SCOUT__`-prefixed environment variables
//!    (e.g. `PROFILE_SCOUT__SCRAPER__PAGE_DELAY_MS=500`)
//!
//! The generation API key is additionally read from `OPENAI_API_KEY`.

#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::constants::{request, site};
use crate::infrastructure::parsing::{ParsingError, ProfileSelectors};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "PROFILE_SCOUT";

/// Environment variable holding the generation service key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid selector configuration: {0}")]
    Selectors(#[from] ParsingError),
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub enrichment: EnrichmentConfig,
    pub logging: LoggingConfig,
}

/// Extraction stage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Base URL for search requests and profile URLs
    pub base_url: String,

    /// Search endpoint path relative to `base_url`
    pub search_path: String,

    /// Per-page request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Pause between consecutive pages in milliseconds
    pub page_delay_ms: u64,

    /// Maximum redirects followed per request
    pub max_redirects: usize,

    /// Keyword used when a request carries none
    pub default_keyword: String,

    /// Page count used when a request carries none
    pub default_pages: u32,

    /// CSS selector cascades
    pub selectors: ProfileSelectors,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: site::BASE_URL.to_string(),
            search_path: site::SEARCH_PATH.to_string(),
            request_timeout_ms: defaults::REQUEST_TIMEOUT_MS,
            page_delay_ms: defaults::PAGE_DELAY_MS,
            max_redirects: defaults::MAX_REDIRECTS,
            default_keyword: request::DEFAULT_KEYWORD.to_string(),
            default_pages: request::DEFAULT_PAGES,
            selectors: ProfileSelectors::default(),
        }
    }
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// Enrichment stage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Generation service key; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Chat completion endpoint root
    pub api_base_url: String,

    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,

    /// Total attempts per record, including the first one
    pub max_attempts: u32,

    /// Backoff unit; the n-th retry waits `base_delay_ms * 2^n`
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay
    pub max_delay_ms: u64,

    /// Per-call timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: defaults::OPENAI_BASE_URL.to_string(),
            model: defaults::MODEL.to_string(),
            temperature: defaults::TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
            max_attempts: defaults::MAX_ATTEMPTS,
            base_delay_ms: defaults::BASE_DELAY_MS,
            max_delay_ms: defaults::MAX_DELAY_MS,
            request_timeout_ms: defaults::GENERATION_TIMEOUT_MS,
        }
    }
}

impl EnrichmentConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Whether a usable key is present
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output (written to stderr)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub directory: Option<PathBuf>,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            directory: None,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("h2".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl AppConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scraper = &self.scraper;
        if scraper.base_url.trim().is_empty() {
            return Err(ConfigError::validation("scraper.base_url must not be empty"));
        }
        if url::Url::parse(&scraper.base_url).is_err() {
            return Err(ConfigError::validation(format!(
                "scraper.base_url is not a valid URL: {}",
                scraper.base_url
            )));
        }
        if scraper.request_timeout_ms == 0 {
            return Err(ConfigError::validation("scraper.request_timeout_ms must be greater than 0"));
        }
        scraper.selectors.ensure_non_empty()?;

        let enrichment = &self.enrichment;
        if enrichment.max_attempts == 0 {
            return Err(ConfigError::validation("enrichment.max_attempts must be greater than 0"));
        }
        if enrichment.base_delay_ms > enrichment.max_delay_ms {
            return Err(ConfigError::validation(
                "enrichment.base_delay_ms cannot be greater than enrichment.max_delay_ms",
            ));
        }
        if !(0.0..=2.0).contains(&enrichment.temperature) {
            return Err(ConfigError::validation("enrichment.temperature must be within [0, 2]"));
        }
        if enrichment.request_timeout_ms == 0 {
            return Err(ConfigError::validation("enrichment.request_timeout_ms must be greater than 0"));
        }
        Ok(())
    }
}

/// Loads `AppConfig` from defaults, an optional file and the environment
#[derive(Debug, Default)]
pub struct ConfigManager {
    config_path: Option<PathBuf>,
    env_overrides: Option<HashMap<String, String>>,
}

impl ConfigManager {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            env_overrides: None,
        }
    }

    /// Use `vars` instead of the process environment
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env_overrides = Some(vars);
        self
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Build, deserialize and validate the configuration
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = &self.config_path {
            info!("Loading configuration from: {:?}", path);
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(self.env_overrides.clone()),
            )
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        if !app_config.enrichment.has_api_key() {
            app_config.enrichment.api_key = self.lookup_env(API_KEY_ENV);
        }

        app_config.validate()?;
        debug!(
            base_url = %app_config.scraper.base_url,
            model = %app_config.enrichment.model,
            api_key_configured = app_config.enrichment.has_api_key(),
            "Configuration loaded"
        );
        Ok(app_config)
    }

    fn lookup_env(&self, name: &str) -> Option<String> {
        let value = match &self.env_overrides {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

/// Default values
pub mod defaults {
    pub const REQUEST_TIMEOUT_MS: u64 = 15_000;
    pub const PAGE_DELAY_MS: u64 = 3_000;
    pub const MAX_REDIRECTS: usize = 10;

    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    pub const MODEL: &str = "gpt-3.5-turbo";
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 150;
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const BASE_DELAY_MS: u64 = 1_000;
    pub const MAX_DELAY_MS: u64 = 30_000;
    pub const GENERATION_TIMEOUT_MS: u64 = 30_000;

    pub const LOG_LEVEL: &str = "info";
}
