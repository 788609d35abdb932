use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::candidate::EnrichedRecord;
use super::outcome::DegradedReason;
use super::request::ScrapeRequest;

/// Result of one pipeline run, as served to callers and stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBatch {
    pub keyword: String,
    pub pages: u32,
    /// Set when the records are placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradedReason>,
    pub profiles: Vec<EnrichedRecord>,
    pub generated_at: DateTime<Utc>,
    /// Wall-clock time the run took, extraction plus enrichment
    pub elapsed_ms: u64,
}

impl ProfileBatch {
    pub fn new(
        request: &ScrapeRequest,
        profiles: Vec<EnrichedRecord>,
        degraded: Option<DegradedReason>,
    ) -> Self {
        Self {
            keyword: request.keyword().to_string(),
            pages: request.pages(),
            degraded,
            profiles,
            generated_at: Utc::now(),
            elapsed_ms: 0,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
