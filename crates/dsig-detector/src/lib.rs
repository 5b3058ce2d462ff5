//! Digit-transition signal detection.
//!
//! Counts, for each rule, how often a digit satisfying the rule follows
//! each preceding digit, and ranks the resulting candidates across
//! instruments.
//!
//! The analysis is a full recomputation over one buffer snapshot per call,
//! so results always describe a single consistent view of the buffers.

pub mod analyzer;
pub mod candidate;
pub mod config;
pub mod error;
pub mod selector;

pub use analyzer::{analyze, extract_digits, transition_stats, RuleOutcome, RuleStats};
pub use candidate::Candidate;
pub use config::DetectorConfig;
pub use error::{DetectorError, DetectorResult};
pub use selector::CandidateSelector;
