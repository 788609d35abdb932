//! Parsing context for search result pages

/// Context information for parsing one results page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// 1-based page index within the run
    pub page: u32,

    /// Base URL profile URLs are derived from
    pub base_url: String,
}

impl ParseContext {
    pub fn new(page: u32, base_url: impl Into<String>) -> Self {
        Self {
            page,
            base_url: base_url.into(),
        }
    }
}
