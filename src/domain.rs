//! Domain module - profile records and extraction outcomes
//!
//! Pure data types with no I/O. Each module is its own file in the
//! domain/ directory; commonly used items are re-exported here.

pub mod batch;
pub mod candidate;
pub mod constants;
pub mod outcome;
pub mod request;

pub use batch::ProfileBatch;
pub use candidate::{CandidateRecord, EnrichedRecord, normalize_identifier};
pub use outcome::{DegradedReason, ExtractionOutcome, placeholder_profiles};
pub use request::ScrapeRequest;
