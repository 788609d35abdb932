//! Test utilities for profile-scout
//!
//! In-memory doubles for the fetcher, generator and sleeper seams so tests
//! run without network access or real delays.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::infrastructure::http_client::{FetchError, PageFetcher};
use crate::infrastructure::openai_client::{GenerationError, SamplingParams, TextGenerator};
use crate::infrastructure::sleeper::Sleeper;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Search results document with one `.user-list-item` row per identifier
pub fn search_page(identifiers: &[&str]) -> String {
    let rows: String = identifiers
        .iter()
        .map(|id| {
            format!(
                r#"<div class="user-list-item">
                     <a data-hovercard-type="user" href="/{id}">{id}</a>
                     <span class="f4">{id} display</span>
                     <p class="mb-1">Bio of {id}</p>
                   </div>"#
            )
        })
        .collect();
    format!("<html><body><div id=\"user_search_results\">{rows}</div></body></html>")
}

/// Page fetcher serving canned bodies keyed by the `p` query parameter
#[derive(Default)]
pub struct StaticPageFetcher {
    responses: HashMap<u32, Result<String, FetchError>>,
    requested: Mutex<Vec<Url>>,
}

impl StaticPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, html: impl Into<String>) -> Self {
        self.responses.insert(page, Ok(html.into()));
        self
    }

    pub fn with_error(mut self, page: u32, error: FetchError) -> Self {
        self.responses.insert(page, Err(error));
        self
    }

    pub fn requested_urls(&self) -> Vec<Url> {
        lock(&self.requested).clone()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested_urls().iter().filter_map(page_of).collect()
    }
}

fn page_of(url: &Url) -> Option<u32> {
    url.query_pairs()
        .find(|(key, _)| key == "p")
        .and_then(|(_, value)| value.parse().ok())
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        lock(&self.requested).push(url.clone());

        match page_of(url).and_then(|page| self.responses.get(&page)) {
            Some(response) => response.clone(),
            None => Ok("<html><body></body></html>".to_string()),
        }
    }
}

/// Text generator replaying a script of results, then a fallback
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: Result<String, GenerationError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Ok("Generated summary".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with `error`
    pub fn failing(error: GenerationError) -> Self {
        Self::new(Vec::new()).with_fallback(Err(error))
    }

    pub fn with_fallback(mut self, fallback: Result<String, GenerationError>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn calls(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &str, _params: &SamplingParams) -> Result<String, GenerationError> {
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Sleeper that records requested delays and returns immediately
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.delays).clone()
    }

    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.delays).push(duration);
    }
}
