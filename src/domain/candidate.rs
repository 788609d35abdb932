use serde::Serialize;

use super::constants::placeholder::IDENTIFIER_PREFIX;

/// One profile extracted from a search results page, before enrichment.
///
/// The profile URL is derived from the identifier at construction time and
/// cannot be set independently, so `profile_url == base + "/" + identifier`
/// always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    #[serde(rename = "username")]
    identifier: String,
    display_name: String,
    bio: String,
    location: String,
    profile_url: String,
}

impl CandidateRecord {
    /// Create a record for `identifier` with empty optional fields.
    pub fn new(base_url: &str, identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let profile_url = format!("{}/{}", base_url.trim_end_matches('/'), identifier);
        Self {
            identifier,
            display_name: String::new(),
            bio: String::new(),
            location: String::new(),
            profile_url,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn bio(&self) -> &str {
        &self.bio
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }

    /// Whether this record is synthetic placeholder data.
    pub fn is_placeholder(&self) -> bool {
        self.identifier.starts_with(IDENTIFIER_PREFIX)
    }
}

/// A candidate record with its generated (or failure) summary attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub profile: CandidateRecord,
    pub summary: String,
}

impl EnrichedRecord {
    pub fn new(profile: CandidateRecord, summary: impl Into<String>) -> Self {
        Self {
            profile,
            summary: summary.into(),
        }
    }
}

/// Normalize a raw handle captured from markup.
///
/// Strips one leading `@` marker, then keeps everything up to the first
/// whitespace run. Returns `None` when nothing usable remains.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim_start();
    let without_marker = trimmed.strip_prefix('@').unwrap_or(trimmed);
    without_marker
        .split_whitespace()
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
