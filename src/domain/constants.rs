//! Site characteristics and domain constants
//!
//! Values here mirror the markup conventions of the profile search surface.
//! Anything an operator might need to tune lives in `infrastructure::config`
//! instead.

/// Search surface characteristics
pub mod site {
    /// Base URL every profile URL is derived from
    pub const BASE_URL: &str = "https://github.com";

    /// Path of the search endpoint, relative to [`BASE_URL`]
    pub const SEARCH_PATH: &str = "/search";

    /// Value of the `type` query parameter selecting user results
    pub const SEARCH_TYPE_USERS: &str = "users";

    /// Page numbers are 1-based
    pub const PAGE_NUMBERING_BASE: u32 = 1;
}

/// Request bounds accepted by the pipeline
pub mod request {
    /// Keyword used when the caller supplies none
    pub const DEFAULT_KEYWORD: &str = "javascript developer";

    /// Page count used when the caller supplies none
    pub const DEFAULT_PAGES: u32 = 2;

    pub const MIN_PAGES: u32 = 1;
    pub const MAX_PAGES: u32 = 5;
}

/// Link-scan fallback
pub mod link_scan {
    /// Single-segment paths that are site navigation or marketing routes,
    /// never profile handles.
    pub const NON_PROFILE_SEGMENTS: &[&str] = &[
        "search",
        "login",
        "join",
        "signup",
        "explore",
        "features",
        "pricing",
        "trending",
        "topics",
        "collections",
        "marketplace",
        "sponsors",
        "enterprise",
        "team",
        "about",
        "contact",
        "security",
        "settings",
        "notifications",
        "issues",
        "pulls",
        "codespaces",
        "organizations",
        "customer-stories",
        "readme",
        "site",
    ];

    /// Bio recorded for profiles found by the link scan
    pub const FALLBACK_BIO: &str = "Profile extracted using fallback method";
}

/// Placeholder data returned in degraded conditions
pub mod placeholder {
    /// Every placeholder identifier starts with this prefix
    pub const IDENTIFIER_PREFIX: &str = "sample-";
}

/// Enrichment
pub mod enrichment {
    /// Summary attached when the generation service is intentionally bypassed
    pub const SUMMARY_NOT_CONFIGURED: &str = "API key not configured";
}
