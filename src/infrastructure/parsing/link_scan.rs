//! Last-resort link scan
//!
//! When no container selector matches, any relative link of the shape
//! `/<segment>` is treated as a possible profile handle.

use std::collections::HashSet;

use scraper::Html;
use tracing::debug;

use super::{ParsingResult, SelectorCascade, collapsed_text};
use crate::domain::constants::link_scan::{FALLBACK_BIO, NON_PROFILE_SEGMENTS};
use crate::domain::{CandidateRecord, normalize_identifier};

pub struct LinkScanner {
    links: SelectorCascade,
    denylist: HashSet<String>,
}

impl LinkScanner {
    pub fn new(link_selectors: &[String]) -> ParsingResult<Self> {
        Ok(Self {
            links: SelectorCascade::compile("profile_link", link_selectors)?,
            denylist: NON_PROFILE_SEGMENTS.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Records for every qualifying link, in document order.
    ///
    /// Every link selector contributes. Duplicates are kept; the run
    /// accumulator drops them.
    pub fn scan(&self, document: &Html, base_url: &str) -> Vec<CandidateRecord> {
        let mut records = Vec::new();
        let mut considered = 0usize;

        for selector in self.links.selectors() {
            for link in document.select(selector) {
                considered += 1;
                let Some(segment) = link.value().attr("href").and_then(single_path_segment) else {
                    continue;
                };
                let Some(identifier) = normalize_identifier(segment) else {
                    continue;
                };
                if self.is_denied(&identifier) {
                    continue;
                }

                let text = collapsed_text(&link);
                let display_name = if text.is_empty() { identifier.clone() } else { text };
                records.push(
                    CandidateRecord::new(base_url, identifier)
                        .with_display_name(display_name)
                        .with_bio(FALLBACK_BIO),
                );
            }
        }

        debug!(
            considered,
            accepted = records.len(),
            "Link scan finished"
        );
        records
    }

    fn is_denied(&self, identifier: &str) -> bool {
        self.denylist.contains(&identifier.to_ascii_lowercase())
    }
}

/// `"/alice"` → `Some("alice")`; anything with a further slash, a query,
/// a fragment or an empty segment → `None`
pub(crate) fn single_path_segment(href: &str) -> Option<&str> {
    let segment = href.strip_prefix('/')?;
    let valid = !segment.is_empty()
        && !segment
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace());
    valid.then_some(segment)
}
