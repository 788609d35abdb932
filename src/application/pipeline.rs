//! Extraction followed by per-record enrichment

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use super::enricher::ProfileSummarizer;
use super::extractor::{ExtractionError, ProfileExtractor};
use crate::domain::constants::enrichment::SUMMARY_NOT_CONFIGURED;
use crate::domain::{EnrichedRecord, ProfileBatch, ScrapeRequest};
use crate::infrastructure::result_cache::ResultCache;

pub struct ProfilePipeline {
    extractor: ProfileExtractor,
    summarizer: Option<ProfileSummarizer>,
}

impl ProfilePipeline {
    /// `summarizer` is `None` when no generation credentials are configured
    pub fn new(extractor: ProfileExtractor, summarizer: Option<ProfileSummarizer>) -> Self {
        Self { extractor, summarizer }
    }

    pub fn has_summarizer(&self) -> bool {
        self.summarizer.is_some()
    }

    /// Extract, then enrich each record in extraction order.
    ///
    /// Enrichment never fails the run; only extraction errors propagate.
    pub async fn run(&self, request: &ScrapeRequest) -> Result<ProfileBatch, ExtractionError> {
        let started = Instant::now();
        let (records, degraded) = self.extractor.extract(request).await?.into_parts();

        let mut profiles = Vec::with_capacity(records.len());
        for record in records {
            let summary = match &self.summarizer {
                Some(summarizer) => summarizer.summarize_with_policy(&record).await,
                None => SUMMARY_NOT_CONFIGURED.to_string(),
            };
            profiles.push(EnrichedRecord::new(record, summary));
        }

        let elapsed = started.elapsed();
        let batch = ProfileBatch::new(request, profiles, degraded).with_elapsed(elapsed);
        info!(
            keyword = %request.keyword(),
            profiles = batch.len(),
            degraded = batch.is_degraded(),
            elapsed_ms = batch.elapsed_ms,
            "Request completed in {:.2} seconds",
            elapsed.as_secs_f64()
        );
        Ok(batch)
    }

    /// Serve from `cache` unless `refresh` is set; successful runs are stored
    pub async fn run_cached(
        &self,
        cache: &ResultCache,
        request: &ScrapeRequest,
        refresh: bool,
    ) -> Result<Arc<ProfileBatch>, ExtractionError> {
        if !refresh {
            if let Some(hit) = cache.get(request).await {
                info!(key = %request.cache_key(), "Serving cached results");
                return Ok(hit);
            }
        }

        let batch = self.run(request).await?;
        Ok(cache.insert(request, batch).await)
    }
}
