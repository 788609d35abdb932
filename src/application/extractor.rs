//! Profile extraction over search result pages
//!
//! Pages are fetched strictly one after another with a pause in between;
//! parsing happens synchronously on each body so no document tree is held
//! across an await point.

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::domain::constants::site;
use crate::domain::{CandidateRecord, DegradedReason, ExtractionOutcome, ScrapeRequest};
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::http_client::{FetchError, PageFetcher};
use crate::infrastructure::parsing::{ParseContext, ParsingError, ProfileListParser};
use crate::infrastructure::sleeper::Sleeper;

/// Extraction failures that are not resolved into placeholder data
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("profile extraction failed: page {page}: {source}")]
    Transport {
        page: u32,
        #[source]
        source: FetchError,
    },

    #[error("profile extraction failed: {0}")]
    Parsing(#[from] ParsingError),

    #[error("profile extraction failed: invalid search URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

pub struct ProfileExtractor {
    fetcher: Arc<dyn PageFetcher>,
    sleeper: Arc<dyn Sleeper>,
    parser: ProfileListParser,
    config: ScraperConfig,
    search_endpoint: Url,
}

impl ProfileExtractor {
    pub fn new(
        config: ScraperConfig,
        fetcher: Arc<dyn PageFetcher>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, ExtractionError> {
        let parser = ProfileListParser::with_selectors(&config.selectors)?;

        let raw = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.search_path.trim_start_matches('/')
        );
        let search_endpoint = Url::parse(&raw).map_err(|e| ExtractionError::InvalidUrl {
            url: raw.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            fetcher,
            sleeper,
            parser,
            config,
            search_endpoint,
        })
    }

    /// Search URL for one page: `q`, `type=users` and the 1-based page index
    pub fn search_url(&self, keyword: &str, page: u32) -> Url {
        let mut url = self.search_endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("q", keyword)
            .append_pair("type", site::SEARCH_TYPE_USERS)
            .append_pair("p", &page.to_string());
        url
    }

    /// Fetch and parse every requested page.
    ///
    /// Records are deduplicated by identifier, first occurrence wins, in
    /// page-then-document order. A blocked page or an empty result set
    /// yields the placeholder set instead of an error.
    #[instrument(skip(self, request), fields(keyword = %request.keyword(), pages = request.pages()))]
    pub async fn extract(&self, request: &ScrapeRequest) -> Result<ExtractionOutcome, ExtractionError> {
        let mut collected: IndexMap<String, CandidateRecord> = IndexMap::new();
        let last_page = site::PAGE_NUMBERING_BASE + request.pages() - 1;

        for page in site::PAGE_NUMBERING_BASE..=last_page {
            let url = self.search_url(request.keyword(), page);
            info!("Fetching search page {}/{}: {}", page, last_page, url);

            let body = match self.fetcher.fetch_page(&url).await {
                Ok(body) => body,
                Err(FetchError::Blocked { status, .. }) => {
                    warn!(page, status, "Search page blocked; returning placeholder profiles");
                    return Ok(ExtractionOutcome::degraded(
                        DegradedReason::Blocked { page, status },
                        &self.config.base_url,
                    ));
                }
                Err(source) => return Err(ExtractionError::Transport { page, source }),
            };

            let context = ParseContext::new(page, self.config.base_url.as_str());
            let parsed = self.parser.parse_page(&body, &context);
            debug!(
                page,
                strategy = ?parsed.strategy,
                containers_tried = parsed.containers_tried,
                skipped = parsed.skipped,
                found = parsed.profiles.len(),
                "Parsed search page"
            );

            for profile in parsed.profiles {
                collected
                    .entry(profile.identifier().to_string())
                    .or_insert(profile);
            }

            if page < last_page {
                self.sleeper.sleep(self.config.page_delay()).await;
            }
        }

        if collected.is_empty() {
            warn!("No profiles found; returning placeholder profiles");
            return Ok(ExtractionOutcome::degraded(
                DegradedReason::NothingFound { pages: request.pages() },
                &self.config.base_url,
            ));
        }

        info!("Extracted {} unique profiles", collected.len());
        Ok(ExtractionOutcome::Extracted(collected.into_values().collect()))
    }
}
