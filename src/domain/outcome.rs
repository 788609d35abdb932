use serde::{Deserialize, Serialize};

use super::candidate::CandidateRecord;

/// Why an extraction run fell back to placeholder data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DegradedReason {
    /// The search surface rejected a page request as automated traffic
    Blocked { page: u32, status: u16 },
    /// Every page was processed but no profile was found
    NothingFound { pages: u32 },
}

impl std::fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocked { page, status } => {
                write!(f, "request for page {page} was blocked (HTTP {status})")
            }
            Self::NothingFound { pages } => {
                write!(f, "no profiles found across {pages} page(s)")
            }
        }
    }
}

/// Result of one extraction run.
///
/// Genuine results and placeholder data are distinct variants so callers
/// never have to sniff identifiers to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Extracted(Vec<CandidateRecord>),
    Degraded {
        reason: DegradedReason,
        records: Vec<CandidateRecord>,
    },
}

impl ExtractionOutcome {
    /// Degraded outcome carrying the fixed placeholder set
    pub fn degraded(reason: DegradedReason, base_url: &str) -> Self {
        Self::Degraded {
            reason,
            records: placeholder_profiles(base_url),
        }
    }

    pub fn records(&self) -> &[CandidateRecord] {
        match self {
            Self::Extracted(records) | Self::Degraded { records, .. } => records,
        }
    }

    pub fn into_parts(self) -> (Vec<CandidateRecord>, Option<DegradedReason>) {
        match self {
            Self::Extracted(records) => (records, None),
            Self::Degraded { reason, records } => (records, Some(reason)),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Synthetic profiles returned when real extraction is blocked or empty.
///
/// Identifiers are identical on every call and all carry the placeholder prefix.
pub fn placeholder_profiles(base_url: &str) -> Vec<CandidateRecord> {
    vec![
        CandidateRecord::new(base_url, "sample-dev1")
            .with_display_name("JavaScript Developer")
            .with_bio("Full-stack developer with 5+ years of experience. React, Node.js, TypeScript enthusiast.")
            .with_location("San Francisco, CA"),
        CandidateRecord::new(base_url, "sample-dev2")
            .with_display_name("Web Developer")
            .with_bio("Frontend specialist focusing on responsive design and accessibility. Vue.js contributor.")
            .with_location("Berlin, Germany"),
        CandidateRecord::new(base_url, "sample-dev3")
            .with_display_name("JS Wizard")
            .with_bio("Building scalable Node.js applications. AWS certified. Open source contributor.")
            .with_location("Toronto, Canada"),
    ]
}
