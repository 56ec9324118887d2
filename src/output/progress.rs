//! Live progress for the fetch stage

use crate::output::Outcome;
use crate::pipeline::HarvestJob;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Thread-safe completion counter with rate and ETA reporting
///
/// Workers call [`ProgressTracker::record`] as each job finishes; nothing
/// else is shared between them.
#[derive(Debug)]
pub struct ProgressTracker {
    total: usize,
    done: AtomicUsize,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            started: Instant::now(),
        }
    }

    /// Counts one finished job and logs it; returns the new done count
    pub fn record(&self, job: &HarvestJob, outcome: &Outcome) -> usize {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let position = format!("[{}/{}]", done, self.total);

        match outcome {
            Outcome::Downloaded { title, chars } => {
                let (rate, eta) = self.rate_and_eta(done);
                tracing::info!(
                    "{} {} ({} chars)  [{:.1}/s  ETA {}s]",
                    position,
                    title,
                    chars,
                    rate,
                    eta.as_secs()
                );
            }
            Outcome::Blank | Outcome::NoExtractableContent => {
                tracing::info!(
                    "{} {} - {} (empty file created)",
                    position,
                    job.item_slug,
                    outcome.kind()
                );
            }
            Outcome::Error(cause) => {
                tracing::warn!("{} {} - ERROR: {}", position, job.item_slug, cause);
            }
            Outcome::Skipped => {
                tracing::debug!("{} {} - already on disk", position, job.item_slug);
            }
        }

        done
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Jobs per second so far and the estimated time to finish the rest
    pub fn rate_and_eta(&self, done: usize) -> (f64, Duration) {
        estimate(done, self.total, self.elapsed())
    }
}

fn estimate(done: usize, total: usize, elapsed: Duration) -> (f64, Duration) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { done as f64 / secs } else { 0.0 };
    let remaining = total.saturating_sub(done) as f64;
    let eta = if rate > 0.0 {
        Duration::from_secs_f64(remaining / rate)
    } else {
        Duration::ZERO
    };
    (rate, eta)
}
