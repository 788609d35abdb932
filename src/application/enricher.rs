//! Summary generation for candidate profiles
//!
//! Every public entry point returns a string: generated text on success, a
//! descriptive failure message otherwise. Only `try_summarize` exposes the
//! underlying error.

use std::sync::Arc;

use tracing::{info, warn};

use super::retry::{BackoffPolicy, FailureClass, RetryState, RetryStep};
use crate::domain::CandidateRecord;
use crate::infrastructure::openai_client::{GenerationError, SamplingParams, TextGenerator};
use crate::infrastructure::sleeper::Sleeper;

pub struct ProfileSummarizer {
    generator: Arc<dyn TextGenerator>,
    sleeper: Arc<dyn Sleeper>,
    params: SamplingParams,
    backoff: BackoffPolicy,
}

impl ProfileSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            generator,
            sleeper,
            params: SamplingParams::default(),
            backoff: BackoffPolicy::default(),
        }
    }

    pub fn with_params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Prompt embedding every field of the record
    pub fn build_prompt(record: &CandidateRecord) -> String {
        format!(
            "GitHub Profile Summary:\n\
             Username: {}\n\
             Name: {}\n\
             Bio: {}\n\
             Location: {}\n\
             Profile URL: {}\n\
             \n\
             Based on this information, summarize the user's main skills, tech stack, and notable contributions.\n\
             If the information is limited, make educated guesses based on what's available.\n\
             Format your response in a concise paragraph.",
            record.identifier(),
            record.display_name(),
            record.bio(),
            record.location(),
            record.profile_url(),
        )
    }

    /// One generation call; the text is trimmed, blank output is an error
    pub async fn try_summarize(&self, record: &CandidateRecord) -> Result<String, GenerationError> {
        info!("Requesting summary for {}", record.identifier());
        let prompt = Self::build_prompt(record);
        let text = self.generator.complete(&prompt, &self.params).await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    /// One attempt, failures described in the returned text
    pub async fn summarize(&self, record: &CandidateRecord) -> String {
        match self.try_summarize(record).await {
            Ok(summary) => summary,
            Err(e) => {
                let cause = e.to_string();
                warn!("Summary failed for {}: {}", record.identifier(), cause);
                FailureClass::from_error(&e)
                    .hint()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Error generating summary: {cause}"))
            }
        }
    }

    /// Retry with exponential backoff until success or `max_attempts` failures
    pub async fn summarize_with_retry(&self, record: &CandidateRecord, max_attempts: u32) -> String {
        let policy = self.backoff.with_max_attempts(max_attempts);
        let mut state = RetryState::new(policy);

        loop {
            let error = match self.try_summarize(record).await {
                Ok(summary) => return summary,
                Err(e) => e,
            };

            match state.record_failure(error) {
                RetryStep::Retry { attempt, delay } => {
                    warn!(
                        "Retry {}/{} for {} in {:?}",
                        attempt,
                        policy.max_attempts,
                        record.identifier(),
                        delay
                    );
                    self.sleeper.sleep(delay).await;
                }
                RetryStep::Exhausted { attempts, last_error } => {
                    let cause = last_error.to_string();
                    let terminal = format!("Failed to summarize after {attempts} attempts: {cause}");
                    warn!("{} ({})", terminal, record.identifier());
                    return match FailureClass::from_error(&last_error).hint() {
                        Some(hint) => format!("{hint} {terminal}"),
                        None => terminal,
                    };
                }
            }
        }
    }

    /// Retry using the configured attempt bound
    pub async fn summarize_with_policy(&self, record: &CandidateRecord) -> String {
        self.summarize_with_retry(record, self.backoff.max_attempts).await
    }
}
