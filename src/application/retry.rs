//! Retry policy and backoff state machine for summary generation
//!
//! The state machine only computes what to do next; the caller owns the
//! actual sleeping, so schedules are testable without real time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::config::EnrichmentConfig;
use crate::infrastructure::openai_client::GenerationError;

/// Exponential backoff settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &EnrichmentConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.max_delay())
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Delay after the given number of failures: `base * 2^failures`, capped
    pub fn delay_for(&self, failures: u32) -> Duration {
        let factor = 2_u32.checked_pow(failures).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&EnrichmentConfig::default())
    }
}

/// Next action after a failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryStep<E> {
    /// Wait `delay`, then make attempt number `attempt` (1-based)
    Retry { attempt: u32, delay: Duration },
    /// No attempts left
    Exhausted { attempts: u32, last_error: E },
}

/// Failure counter for one operation
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: BackoffPolicy,
    failures: u32,
}

impl RetryState {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, failures: 0 }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record a failure and decide what happens next
    pub fn record_failure<E>(&mut self, error: E) -> RetryStep<E> {
        self.failures += 1;

        if self.failures < self.policy.max_attempts {
            RetryStep::Retry {
                attempt: self.failures + 1,
                delay: self.policy.delay_for(self.failures),
            }
        } else {
            RetryStep::Exhausted {
                attempts: self.failures,
                last_error: error,
            }
        }
    }
}

/// Advisory class of a generation failure; affects message text only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Authentication,
    RateLimited,
    Other,
}

impl FailureClass {
    /// HTTP status decides when there is one; otherwise the message text
    pub fn from_error(error: &GenerationError) -> Self {
        match error {
            GenerationError::Api { status: 401 | 403, .. } => Self::Authentication,
            GenerationError::Api { status: 429, .. } => Self::RateLimited,
            other => Self::classify(&other.to_string()),
        }
    }

    pub fn classify(cause: &str) -> Self {
        let cause = cause.to_lowercase();

        if cause.contains("api key") || cause.contains("invalid_api_key") {
            Self::Authentication
        } else if cause.contains("rate limit") || cause.contains("rate_limit") {
            Self::RateLimited
        } else {
            Self::Other
        }
    }

    /// User-facing message for the class, if it has one
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::Authentication => {
                Some("Error: Invalid or missing OpenAI API key. Check your environment variables.")
            }
            Self::RateLimited => Some("Error: OpenAI rate limit reached. Try again later."),
            Self::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn policy(max_attempts: u32) -> BackoffPolicy {
        BackoffPolicy::new(max_attempts, Duration::from_millis(100), Duration::from_secs(30))
    }

    #[test]
    fn delays_double_per_failure() {
        let policy = policy(5);
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
    }

    #[test]
    fn delays_are_capped() {
        let policy = BackoffPolicy::new(10, Duration::from_secs(1), Duration::from_secs(5));
        assert_eq!(policy.delay_for(3), Duration::from_secs(5));
        assert_eq!(policy.delay_for(40), Duration::from_secs(5));
    }

    #[test]
    fn three_attempts_retry_twice_then_exhaust() {
        let mut state = RetryState::new(policy(3));

        assert_eq!(
            state.record_failure("a"),
            RetryStep::Retry { attempt: 2, delay: Duration::from_millis(200) }
        );
        assert_eq!(
            state.record_failure("b"),
            RetryStep::Retry { attempt: 3, delay: Duration::from_millis(400) }
        );
        assert_eq!(
            state.record_failure("c"),
            RetryStep::Exhausted { attempts: 3, last_error: "c" }
        );
        assert_eq!(state.failures(), 3);
    }

    #[test]
    fn zero_attempts_behaves_as_one() {
        let mut state = RetryState::new(policy(0));
        assert_eq!(
            state.record_failure(()),
            RetryStep::Exhausted { attempts: 1, last_error: () }
        );
    }

    #[rstest]
    #[case("Incorrect API key provided", FailureClass::Authentication)]
    #[case("Rate limit reached for requests", FailureClass::RateLimited)]
    #[case("Network error: connection reset", FailureClass::Other)]
    #[case("Network error: timeout after 4010ms", FailureClass::Other)]
    #[case("Parse error: unexpected token at offset 1429", FailureClass::Other)]
    fn classifies_causes(#[case] cause: &str, #[case] expected: FailureClass) {
        assert_eq!(FailureClass::classify(cause), expected);
    }

    #[rstest]
    #[case(401, "unauthorized", FailureClass::Authentication)]
    #[case(403, "forbidden", FailureClass::Authentication)]
    #[case(429, "slow down", FailureClass::RateLimited)]
    #[case(500, "upstream 401 from proxy", FailureClass::Other)]
    #[case(400, "Incorrect API key provided", FailureClass::Authentication)]
    fn api_errors_classify_by_status(
        #[case] status: u16,
        #[case] message: &str,
        #[case] expected: FailureClass,
    ) {
        let error = GenerationError::Api { status, message: message.to_string() };
        assert_eq!(FailureClass::from_error(&error), expected);
    }

    #[test]
    fn status_digits_in_other_errors_are_ignored() {
        let error = GenerationError::Network("timeout after 4010ms".into());
        assert_eq!(FailureClass::from_error(&error), FailureClass::Other);
    }

    #[test]
    fn only_known_classes_have_hints() {
        assert!(FailureClass::Authentication.hint().unwrap().contains("API key"));
        assert!(FailureClass::RateLimited.hint().unwrap().contains("rate limit"));
        assert!(FailureClass::Other.hint().is_none());
    }
}
