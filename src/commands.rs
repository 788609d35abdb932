//! Command handlers behind the CLI
//!
//! `ScoutApp` wires configuration into the pipeline once; handlers return
//! serializable values and leave presentation to the caller.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::application::{BackoffPolicy, ExtractionError, ProfileExtractor, ProfilePipeline, ProfileSummarizer};
use crate::domain::{ProfileBatch, ScrapeRequest};
use crate::infrastructure::{
    AppConfig, HttpClient, HttpClientConfig, OpenAiClient, ResultCache, SamplingParams, TokioSleeper,
};

/// Reply of the `health` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub api_key_configured: bool,
}

/// One request line of the `batch` command: `[!]<keyword words> [pages]`.
///
/// A trailing integer is the page count; a leading `!` bypasses the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLine {
    pub keyword: Option<String>,
    pub pages: Option<u32>,
    pub refresh: bool,
}

impl BatchLine {
    /// `None` for blank lines and `#` comments
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (refresh, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, line),
        };

        let mut words: Vec<&str> = rest.split_whitespace().collect();
        let pages = words.last().and_then(|w| w.parse::<u32>().ok());
        if pages.is_some() {
            words.pop();
        }
        let keyword = (!words.is_empty()).then(|| words.join(" "));

        Some(Self { keyword, pages, refresh })
    }
}

/// Per-line reply of the `batch` command, written as one JSON line
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReply {
    pub keyword: String,
    pub pages: u32,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Arc<ProfileBatch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts reported when a batch run ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub requests: usize,
    pub cache_hits: usize,
    pub failures: usize,
}

pub struct ScoutApp {
    config: AppConfig,
    pipeline: ProfilePipeline,
    cache: ResultCache,
}

impl ScoutApp {
    pub fn new(config: AppConfig, pipeline: ProfilePipeline) -> Self {
        Self {
            config,
            pipeline,
            cache: ResultCache::new(),
        }
    }

    /// Build the production wiring: HTTP fetcher, tokio timer and, when a
    /// key is configured, the chat completion client
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let sleeper = Arc::new(TokioSleeper);

        let http_client = HttpClient::with_config(HttpClientConfig::from_scraper_config(&config.scraper))
            .context("Failed to create HTTP client")?;
        let extractor = ProfileExtractor::new(config.scraper.clone(), Arc::new(http_client), sleeper.clone())
            .context("Failed to create profile extractor")?;

        let summarizer = if config.enrichment.has_api_key() {
            let client = OpenAiClient::from_config(&config.enrichment)
                .context("Failed to create generation client")?;
            Some(
                ProfileSummarizer::new(Arc::new(client), sleeper)
                    .with_params(SamplingParams::from_config(&config.enrichment))
                    .with_backoff(BackoffPolicy::from_config(&config.enrichment)),
            )
        } else {
            warn!("OPENAI_API_KEY not set; summaries disabled");
            None
        };

        Ok(Self::new(config, ProfilePipeline::new(extractor, summarizer)))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Request from optional CLI arguments, falling back to configured defaults
    pub fn request(&self, keyword: Option<String>, pages: Option<u32>) -> ScrapeRequest {
        ScrapeRequest::new(
            keyword.unwrap_or_else(|| self.config.scraper.default_keyword.clone()),
            pages.unwrap_or(self.config.scraper.default_pages),
        )
    }

    pub async fn scrape(&self, request: &ScrapeRequest, refresh: bool) -> Result<Arc<ProfileBatch>, ExtractionError> {
        info!(keyword = %request.keyword(), pages = request.pages(), refresh, "Scrape requested");
        self.pipeline.run_cached(&self.cache, request, refresh).await
    }

    /// Serve request lines from `input` until EOF, one JSON reply line each.
    ///
    /// All lines share this app's cache, so repeated requests are served
    /// without fetching. A failed line is reported and the run continues.
    pub async fn run_batch<R, W>(&self, input: R, output: &mut W) -> Result<BatchSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = BatchSummary::default();
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await.context("Failed to read batch input")? {
            let Some(parsed) = BatchLine::parse(&line) else {
                continue;
            };
            let request = self.request(parsed.keyword, parsed.pages);
            let cached = !parsed.refresh && self.cache.get(&request).await.is_some();

            let reply = match self.scrape(&request, parsed.refresh).await {
                Ok(batch) => BatchReply {
                    keyword: request.keyword().to_string(),
                    pages: request.pages(),
                    cached,
                    result: Some(batch),
                    error: None,
                },
                Err(e) => {
                    error!(key = %request.cache_key(), "{}", e);
                    summary.failures += 1;
                    BatchReply {
                        keyword: request.keyword().to_string(),
                        pages: request.pages(),
                        cached: false,
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
            };

            summary.requests += 1;
            if reply.cached {
                summary.cache_hits += 1;
            }

            let mut encoded = serde_json::to_vec(&reply)?;
            encoded.push(b'\n');
            output.write_all(&encoded).await?;
            output.flush().await?;
        }

        info!(
            requests = summary.requests,
            cache_hits = summary.cache_hits,
            failures = summary.failures,
            "Batch finished"
        );
        Ok(summary)
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok",
            api_key_configured: self.pipeline.has_summarizer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ScraperConfig;
    use crate::infrastructure::FetchError;
    use crate::test_utils::{RecordingSleeper, StaticPageFetcher, search_page};
    use rstest::rstest;

    fn app(fetcher: StaticPageFetcher) -> ScoutApp {
        app_with(Arc::new(fetcher))
    }

    fn app_with(fetcher: Arc<StaticPageFetcher>) -> ScoutApp {
        let config = AppConfig::default();
        let extractor =
            ProfileExtractor::new(config.scraper.clone(), fetcher, Arc::new(RecordingSleeper::new())).unwrap();
        ScoutApp::new(config, ProfilePipeline::new(extractor, None))
    }

    fn replies(output: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn health_reports_missing_key() {
        let health = app(StaticPageFetcher::new()).health();
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "apiKeyConfigured": false}));
    }

    #[test]
    fn request_uses_configured_defaults() {
        let app = app(StaticPageFetcher::new());
        let request = app.request(None, None);
        assert_eq!(request.keyword(), ScraperConfig::default().default_keyword);
        assert_eq!(request.pages(), 2);

        let request = app.request(Some("go".into()), Some(9));
        assert_eq!(request.keyword(), "go");
        assert_eq!(request.pages(), 5);
    }

    #[tokio::test]
    async fn scrape_populates_cache() {
        let app = app(StaticPageFetcher::new().with_page(1, search_page(&["alice"])));
        let request = app.request(Some("rust".into()), Some(1));

        let batch = app.scrape(&request, false).await.unwrap();

        assert_eq!(batch.profiles[0].profile.identifier(), "alice");
        assert_eq!(app.cache().len().await, 1);
    }

    #[test]
    fn from_config_without_key_disables_summaries() {
        let app = ScoutApp::from_config(AppConfig::default()).unwrap();
        assert!(!app.health().api_key_configured);
    }

    #[rstest]
    #[case("rust 1", Some("rust"), Some(1), false)]
    #[case("  rust developer 3 ", Some("rust developer"), Some(3), false)]
    #[case("!go", Some("go"), None, true)]
    #[case("! 4", None, Some(4), true)]
    #[case("web3 dev", Some("web3 dev"), None, false)]
    fn batch_lines_parse(
        #[case] line: &str,
        #[case] keyword: Option<&str>,
        #[case] pages: Option<u32>,
        #[case] refresh: bool,
    ) {
        let parsed = BatchLine::parse(line).unwrap();
        assert_eq!(parsed.keyword.as_deref(), keyword);
        assert_eq!(parsed.pages, pages);
        assert_eq!(parsed.refresh, refresh);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("# comment")]
    fn batch_skips_blank_and_comment_lines(#[case] line: &str) {
        assert!(BatchLine::parse(line).is_none());
    }

    #[tokio::test]
    async fn batch_serves_repeats_from_cache_and_refreshes_on_demand() {
        let fetcher = Arc::new(StaticPageFetcher::new().with_page(1, search_page(&["alice"])));
        let app = app_with(fetcher.clone());
        let mut output = Vec::new();

        let summary = app
            .run_batch(&b"rust 1\nrust 1\n!rust 1\n"[..], &mut output)
            .await
            .unwrap();

        assert_eq!(summary, BatchSummary { requests: 3, cache_hits: 1, failures: 0 });
        assert_eq!(fetcher.requested_pages(), vec![1, 1]);

        let replies = replies(&output);
        let cached: Vec<bool> = replies.iter().map(|r| r["cached"].as_bool().unwrap()).collect();
        assert_eq!(cached, vec![false, true, false]);
        assert_eq!(replies[1]["result"]["profiles"][0]["username"], "alice");
        assert_eq!(replies[0]["result"]["generatedAt"], replies[1]["result"]["generatedAt"]);
    }

    #[tokio::test]
    async fn batch_reports_failures_and_keeps_going() {
        let fetcher = Arc::new(
            StaticPageFetcher::new()
                .with_error(1, FetchError::HttpStatus { status: 500, url: "u".into() }),
        );
        let app = app_with(fetcher.clone());
        let mut output = Vec::new();

        let summary = app.run_batch(&b"rust 1\n\nrust 1\n"[..], &mut output).await.unwrap();

        assert_eq!(summary, BatchSummary { requests: 2, cache_hits: 0, failures: 2 });
        assert_eq!(fetcher.requested_pages(), vec![1, 1]);
        let replies = replies(&output);
        assert!(replies[0]["error"].as_str().unwrap().starts_with("profile extraction failed: "));
        assert!(replies[0].get("result").is_none());
    }
}
