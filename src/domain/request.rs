use serde::{Deserialize, Serialize};

use super::constants::request::{DEFAULT_KEYWORD, DEFAULT_PAGES, MAX_PAGES, MIN_PAGES};

/// A validated (keyword, page count) pair
///
/// Deserialization goes through [`ScrapeRequest::new`], so decoded requests
/// are defaulted and clamped like constructed ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawScrapeRequest")]
pub struct ScrapeRequest {
    keyword: String,
    pages: u32,
}

impl ScrapeRequest {
    /// Blank keywords fall back to the default keyword and the page count is
    /// clamped into the accepted range.
    pub fn new(keyword: impl Into<String>, pages: u32) -> Self {
        let keyword = keyword.into();
        let keyword = match keyword.trim() {
            "" => DEFAULT_KEYWORD.to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            keyword,
            pages: pages.clamp(MIN_PAGES, MAX_PAGES),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Key used by the result cache
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.keyword, self.pages)
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawScrapeRequest {
    keyword: String,
    pages: u32,
}

impl Default for RawScrapeRequest {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_KEYWORD.to_string(),
            pages: DEFAULT_PAGES,
        }
    }
}

impl From<RawScrapeRequest> for ScrapeRequest {
    fn from(raw: RawScrapeRequest) -> Self {
        Self::new(raw.keyword, raw.pages)
    }
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD, DEFAULT_PAGES)
    }
}
