//! Profile list parser
//!
//! Robust HTML parsing for search result pages: a container cascade picks the
//! authoritative row selector for the page, field cascades extract each
//! record, and the link scan runs only when no container selector matches.

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::{debug, warn};

use super::link_scan::single_path_segment;
use super::{
    LinkScanner, ParseContext, ParsingResult, ProfileSelectors, SelectorCascade,
    collapsed_text,
};
use crate::domain::{CandidateRecord, normalize_identifier};

/// Which strategy produced a page's records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractionStrategy {
    /// Container selector at `index` of the cascade matched
    Selector { index: usize, selector: String },
    /// No container selector matched; relative links were scanned
    LinkScan,
}

/// Records extracted from one page plus how they were found
#[derive(Debug, Clone)]
pub struct PageParse {
    pub profiles: Vec<CandidateRecord>,
    pub strategy: ExtractionStrategy,
    /// Container selectors evaluated before one matched (or all of them)
    pub containers_tried: usize,
    /// Containers dropped because no identifier could be extracted
    pub skipped: usize,
}

/// Parser for user rows on search result pages
pub struct ProfileListParser {
    containers: SelectorCascade,
    identifier: SelectorCascade,
    display_name: SelectorCascade,
    bio: SelectorCascade,
    location_icon: SelectorCascade,
    location: SelectorCascade,
    link_scan: LinkScanner,
}

impl ProfileListParser {
    /// Create a parser with the default selector cascades
    pub fn new() -> ParsingResult<Self> {
        Self::with_selectors(&ProfileSelectors::default())
    }

    /// Create a parser with custom selector configuration
    pub fn with_selectors(selectors: &ProfileSelectors) -> ParsingResult<Self> {
        Ok(Self {
            containers: SelectorCascade::compile("container", &selectors.container)?,
            identifier: SelectorCascade::compile("identifier", &selectors.identifier)?,
            display_name: SelectorCascade::compile("display_name", &selectors.display_name)?,
            bio: SelectorCascade::compile("bio", &selectors.bio)?,
            location_icon: SelectorCascade::compile("location_icon", &selectors.location_icon)?,
            location: SelectorCascade::compile("location", &selectors.location)?,
            link_scan: LinkScanner::new(&selectors.profile_link)?,
        })
    }

    /// Parse raw page HTML.
    ///
    /// The document tree is dropped before returning so callers can hold the
    /// result across `.await` points.
    pub fn parse_page(&self, html: &str, context: &ParseContext) -> PageParse {
        let document = Html::parse_document(html);
        self.parse_document(&document, context)
    }

    pub fn parse_document(&self, document: &Html, context: &ParseContext) -> PageParse {
        let hit = self.containers.try_in_order(|selector| {
            let elements: Vec<ElementRef<'_>> = document.select(selector).collect();
            (!elements.is_empty()).then_some(elements)
        });

        let Some(hit) = hit else {
            warn!(
                "No container selector matched on page {} ({} tried); falling back to link scan",
                context.page,
                self.containers.len()
            );
            let profiles = self.link_scan.scan(document, &context.base_url);
            return PageParse {
                profiles,
                strategy: ExtractionStrategy::LinkScan,
                containers_tried: self.containers.len(),
                skipped: 0,
            };
        };

        debug!(
            "Found {} containers on page {} using selector '{}'",
            hit.value.len(),
            context.page,
            hit.selector
        );

        let mut profiles = Vec::with_capacity(hit.value.len());
        let mut skipped = 0;
        for element in &hit.value {
            match self.extract_profile(element, &context.base_url) {
                Some(profile) => profiles.push(profile),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} containers without an identifier on page {}", skipped, context.page);
        }

        PageParse {
            profiles,
            strategy: ExtractionStrategy::Selector {
                index: hit.index,
                selector: hit.selector.to_string(),
            },
            containers_tried: hit.index + 1,
            skipped,
        }
    }

    /// Extract one record from a container, or `None` when no identifier
    /// sub-selector yields a handle
    fn extract_profile(&self, element: &ElementRef<'_>, base_url: &str) -> Option<CandidateRecord> {
        let identifier = self.extract_identifier(element)?;

        let display_name = self.display_name.first_text(element).unwrap_or_default();
        let bio = self.bio.joined_text(element).unwrap_or_default();
        let location = self.extract_location(element).unwrap_or_default();

        Some(
            CandidateRecord::new(base_url, identifier)
                .with_display_name(display_name)
                .with_bio(bio)
                .with_location(location),
        )
    }

    /// First sub-selector whose first match yields a handle, from its text or,
    /// when the text is blank, from a single-segment `href`
    fn extract_identifier(&self, element: &ElementRef<'_>) -> Option<String> {
        self.identifier
            .try_in_order(|selector| {
                let candidate = element.select(selector).next()?;
                let text = collapsed_text(&candidate);
                if text.is_empty() {
                    candidate
                        .value()
                        .attr("href")
                        .and_then(single_path_segment)
                        .and_then(normalize_identifier)
                } else {
                    normalize_identifier(&text)
                }
            })
            .map(|hit| hit.value)
    }

    fn extract_location(&self, element: &ElementRef<'_>) -> Option<String> {
        self.location_icon
            .try_in_order(|selector| {
                let icon = element.select(selector).next()?;
                let parent = icon.parent().and_then(ElementRef::wrap)?;
                Some(collapsed_text(&parent)).filter(|text| !text.is_empty())
            })
            .map(|hit| hit.value)
            .or_else(|| self.location.first_text(element))
    }
}
