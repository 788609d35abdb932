//! Profile Scout - developer profile discovery with generated summaries
//!
//! Scrapes user search result pages with layered selector fallbacks and
//! attaches a short generated summary to every profile found.

pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod test_utils;

pub use application::{ExtractionError, ProfileExtractor, ProfilePipeline, ProfileSummarizer};
pub use commands::{HealthStatus, ScoutApp};
pub use domain::{CandidateRecord, EnrichedRecord, ExtractionOutcome, ProfileBatch, ScrapeRequest};
