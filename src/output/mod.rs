//! Harvest outcomes and reporting
//!
//! This module handles:
//! - The per-job [`Outcome`] classification
//! - Aggregating outcomes into a [`HarvestReport`]
//! - Live progress (rate and ETA) while the fetch pool drains
//! - Printing the final summary

mod outcome;
mod progress;
mod report;

pub use outcome::{Outcome, OutcomeKind};
pub use progress::ProgressTracker;
pub use report::{print_summary, HarvestReport, OutcomeCounts};
