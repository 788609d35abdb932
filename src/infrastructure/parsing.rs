//! HTML parsing infrastructure
//!
//! Trait-based parsing with selector cascades: every field is located by an
//! ordered list of CSS selectors tried until one produces a value, so markup
//! changes on the search surface degrade extraction instead of breaking it.

pub mod cascade;
pub mod config;
pub mod context;
pub mod error;
pub mod link_scan;
pub mod profile_list_parser;

pub use cascade::{CascadeHit, SelectorCascade};
pub use config::ProfileSelectors;
pub use context::ParseContext;
pub use error::{ParsingError, ParsingResult};
pub use link_scan::LinkScanner;
pub use profile_list_parser::{ExtractionStrategy, PageParse, ProfileListParser};

use scraper::ElementRef;

/// Text content of an element with whitespace runs collapsed to single spaces
pub(crate) fn collapsed_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
