//! Application layer
//!
//! Orchestrates extraction and enrichment over the infrastructure traits.

pub mod enricher;
pub mod extractor;
pub mod pipeline;
pub mod retry;

pub use enricher::ProfileSummarizer;
pub use extractor::{ExtractionError, ProfileExtractor};
pub use pipeline::ProfilePipeline;
pub use retry::{BackoffPolicy, FailureClass, RetryState, RetryStep};
