//! Selector configuration for profile extraction
//!
//! Every list is an ordered cascade: earlier entries win. The defaults are
//! strategies that have historically matched user rows on the search surface.

use serde::{Deserialize, Serialize};

use super::error::{ParsingError, ParsingResult};

/// CSS selector cascades for search result pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSelectors {
    /// Result row containers; the first selector with any match is authoritative
    pub container: Vec<String>,

    /// Handle link inside a container
    pub identifier: Vec<String>,

    pub display_name: Vec<String>,

    /// All matches of the winning selector are joined
    pub bio: Vec<String>,

    /// Location icons; the text is read from the icon's parent element
    pub location_icon: Vec<String>,

    /// Elements holding the location text directly
    pub location: Vec<String>,

    /// Links considered by the last-resort link scan
    pub profile_link: Vec<String>,
}

impl Default for ProfileSelectors {
    fn default() -> Self {
        Self {
            container: strings(&[
                ".user-list-item",
                ".Box-row",
                ".Box .Box-row",
                "div[data-testid='user-result-item']",
                "div[data-hovercard-type='user']",
                ".search-result",
            ]),
            identifier: strings(&[
                "a[data-hovercard-type='user']",
                "a.user-list-info",
                "a.mr-1",
                ".f4 a",
                "a[data-hydro-click*='user_name']",
                ".color-fg-muted a",
            ]),
            display_name: strings(&[
                "span.f4",
                "em",
                ".color-fg-muted span",
                ".color-fg-muted b",
            ]),
            bio: strings(&["p:not(.f5)", ".color-fg-muted p", "div.f6", ".mb-0"]),
            location_icon: strings(&[".octicon-location"]),
            location: strings(&["[itemprop='homeLocation']", ".user-location"]),
            profile_link: strings(&["a[href^='/']"]),
        }
    }
}

impl ProfileSelectors {
    /// The cascades extraction cannot work without must have entries
    pub fn ensure_non_empty(&self) -> ParsingResult<()> {
        for (name, list) in [
            ("container", &self.container),
            ("identifier", &self.identifier),
            ("profile_link", &self.profile_link),
        ] {
            if list.is_empty() {
                return Err(ParsingError::EmptySelectorList {
                    cascade: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
