//! Aggregated harvest results

use crate::output::{Outcome, OutcomeKind};
use crate::pipeline::HarvestJob;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Tally of outcomes per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub downloaded: usize,
    pub skipped: usize,
    pub blank: usize,
    pub no_extractable: usize,
    pub errors: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Downloaded => self.downloaded += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::Blank => self.blank += 1,
            OutcomeKind::NoExtractableContent => self.no_extractable += 1,
            OutcomeKind::Error => self.errors += 1,
        }
    }

    pub fn get(&self, kind: OutcomeKind) -> usize {
        match kind {
            OutcomeKind::Downloaded => self.downloaded,
            OutcomeKind::Skipped => self.skipped,
            OutcomeKind::Blank => self.blank,
            OutcomeKind::NoExtractableContent => self.no_extractable,
            OutcomeKind::Error => self.errors,
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.blank + self.no_extractable + self.errors
    }

    /// Jobs that ended with a zero-length marker
    pub fn negative_cache(&self) -> usize {
        OutcomeKind::ALL
            .into_iter()
            .filter(OutcomeKind::is_negative_cache)
            .map(|kind| self.get(kind))
            .sum()
    }

    /// Jobs that went through the fetch pool
    pub fn attempted(&self) -> usize {
        self.total() - self.skipped
    }
}

/// Everything a harvest run produced
///
/// `results` holds skipped jobs first, then fetched jobs in completion order.
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub results: Vec<(HarvestJob, Outcome)>,
    pub counts: OutcomeCounts,
    pub chars_downloaded: usize,
}

impl HarvestReport {
    /// Builds a report, tallying counts from the results
    pub fn new(
        started_at: DateTime<Utc>,
        elapsed: Duration,
        results: Vec<(HarvestJob, Outcome)>,
    ) -> Self {
        let mut counts = OutcomeCounts::default();
        let mut chars_downloaded = 0;

        for (_, outcome) in &results {
            counts.record(outcome.kind());
            if let Outcome::Downloaded { chars, .. } = outcome {
                chars_downloaded += chars;
            }
        }

        Self {
            started_at,
            elapsed,
            results,
            counts,
            chars_downloaded,
        }
    }

    /// Jobs that failed and will be retried by the next run
    pub fn failures(&self) -> impl Iterator<Item = (&HarvestJob, &str)> {
        self.results.iter().filter_map(|(job, outcome)| match outcome {
            Outcome::Error(cause) => Some((job, cause.as_str())),
            _ => None,
        })
    }
}

/// Failures listed individually in the summary; the rest are only counted
const MAX_LISTED_FAILURES: usize = 20;

/// Prints the run summary to stdout
pub fn print_summary(report: &HarvestReport) {
    print!("{}", format_summary(report));
}

fn format_summary(report: &HarvestReport) -> String {
    let rule = "=".repeat(60);
    let counts = &report.counts;
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", rule));
    out.push_str(&format!(
        "Started {} - done in {:.0}s\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.elapsed.as_secs_f64()
    ));
    out.push_str(&format!("  Downloaded:      {}\n", counts.downloaded));
    out.push_str(&format!(
        "  No transcript:   {} (blank {}, no payload {})\n",
        counts.negative_cache(),
        counts.get(OutcomeKind::Blank),
        counts.get(OutcomeKind::NoExtractableContent)
    ));
    out.push_str(&format!("  Errors:          {}\n", counts.errors));
    out.push_str(&format!("  Already existed: {}\n", counts.skipped));
    out.push_str(&format!("  Characters:      {}\n", report.chars_downloaded));

    if counts.errors > 0 {
        out.push_str("\nFailed (retried on the next run):\n");
        for (job, cause) in report.failures().take(MAX_LISTED_FAILURES) {
            out.push_str(&format!(
                "  {}/{}: {}\n",
                job.output_directory.display(),
                job.item_slug,
                cause
            ));
        }
        if counts.errors > MAX_LISTED_FAILURES {
            out.push_str(&format!(
                "  ... and {} more\n",
                counts.errors - MAX_LISTED_FAILURES
            ));
        }
    }

    out.push_str(&format!("{}\n", rule));
    out
}
