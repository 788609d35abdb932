//! Infrastructure layer for HTTP access, parsing, and external integrations
//!
//! Fetching search pages, parsing them into candidate records, talking to
//! the text generation service, configuration, logging and caching.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod openai_client;
pub mod parsing;
pub mod result_cache;
pub mod sleeper;

pub use config::{AppConfig, ConfigError, ConfigManager, EnrichmentConfig, LoggingConfig, ScraperConfig};
pub use http_client::{FetchError, HttpClient, HttpClientConfig, PageFetcher};
pub use logging::{get_log_directory, init_logging};
pub use openai_client::{GenerationError, OpenAiClient, SamplingParams, TextGenerator};
pub use parsing::{
    ExtractionStrategy, PageParse, ParseContext, ParsingError, ParsingResult, ProfileListParser,
    ProfileSelectors,
};
pub use result_cache::ResultCache;
pub use sleeper::{Sleeper, TokioSleeper};
