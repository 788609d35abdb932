//! Ordered selector strategies with a single try-in-order combinator
//!
//! Used both for picking the authoritative container selector of a page and
//! for locating individual fields inside a container.

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

use super::{ParsingError, ParsingResult, collapsed_text};

/// One compiled strategy, kept with its source text for reporting
#[derive(Debug, Clone)]
struct Strategy {
    source: String,
    selector: Selector,
}

/// Result of a successful cascade attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeHit<'c, T> {
    /// Position of the winning strategy in the cascade
    pub index: usize,
    /// Selector text of the winning strategy
    pub selector: &'c str,
    pub value: T,
}

/// Ordered list of CSS selector strategies
#[derive(Debug, Clone)]
pub struct SelectorCascade {
    name: String,
    strategies: Vec<Strategy>,
}

impl SelectorCascade {
    /// Compile selector strings in order.
    ///
    /// Invalid entries are logged and dropped. An empty list yields an empty
    /// cascade; a non-empty list with no valid entry is an error.
    pub fn compile(name: &str, sources: &[String]) -> ParsingResult<Self> {
        let mut strategies = Vec::with_capacity(sources.len());
        let mut errors = Vec::new();

        for source in sources {
            match Selector::parse(source) {
                Ok(selector) => strategies.push(Strategy {
                    source: source.clone(),
                    selector,
                }),
                Err(e) => {
                    let error = ParsingError::invalid_selector(source, &e.to_string());
                    warn!("Failed to compile selector for '{}': {}", name, error);
                    errors.push(error.to_string());
                }
            }
        }

        if strategies.is_empty() && !sources.is_empty() {
            return Err(ParsingError::NoValidSelectors {
                cascade: name.to_string(),
                errors: errors.join(", "),
            });
        }

        if !errors.is_empty() {
            debug!("Some selectors for '{}' failed to compile: {}", name, errors.join(", "));
        }

        Ok(Self {
            name: name.to_string(),
            strategies,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Compiled selectors in cascade order
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.strategies.iter().map(|strategy| &strategy.selector)
    }

    /// Run `attempt` against each strategy in order and stop at the first
    /// `Some`. Later strategies are never evaluated once one succeeds.
    pub fn try_in_order<T>(&self, mut attempt: impl FnMut(&Selector) -> Option<T>) -> Option<CascadeHit<'_, T>> {
        self.strategies
            .iter()
            .enumerate()
            .find_map(|(index, strategy)| {
                attempt(&strategy.selector).map(|value| CascadeHit {
                    index,
                    selector: strategy.source.as_str(),
                    value,
                })
            })
    }

    /// Collapsed text of the first element matched by the first strategy
    /// that yields non-empty text inside `scope`
    pub fn first_text(&self, scope: &ElementRef<'_>) -> Option<String> {
        self.try_in_order(|selector| {
            scope
                .select(selector)
                .next()
                .map(|element| collapsed_text(&element))
                .filter(|text| !text.is_empty())
        })
        .map(|hit| hit.value)
    }

    /// Joined text of every element matched by the first strategy with a
    /// non-empty result inside `scope`
    pub fn joined_text(&self, scope: &ElementRef<'_>) -> Option<String> {
        self.try_in_order(|selector| {
            let joined = scope
                .select(selector)
                .map(|element| collapsed_text(&element))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            (!joined.is_empty()).then_some(joined)
        })
        .map(|hit| hit.value)
    }
}
