//! Bounded worker pools
//!
//! Each pipeline stage owns a pool of a fixed width. A unit of work holds its
//! slot from start to finish, results come back in completion order, and one
//! unit failing (or panicking) never affects its siblings.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// A named pool that runs at most `width` units of work at once
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: &'static str,
    width: usize,
}

impl WorkerPool {
    /// Creates a pool; a width of zero is treated as one
    pub fn new(name: &'static str, width: usize) -> Self {
        Self {
            name,
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Runs `work` for every item and returns the outputs in completion order
    ///
    /// A slot is acquired before each unit is spawned, so at most `width`
    /// units exist at any time no matter how many items are submitted.
    pub async fn run<I, F, Fut>(&self, items: I, work: F) -> Vec<Fut::Output>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let slots = Arc::new(Semaphore::new(self.width));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();
        let mut submitted = 0usize;

        for item in items {
            let permit = match Arc::clone(&slots).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let unit = work(item);
            let tx = tx.clone();
            workers.spawn(async move {
                let output = unit.await;
                // receiver outlives every worker
                let _ = tx.send(output);
                drop(permit);
            });
            submitted += 1;

            while let Some(joined) = workers.try_join_next() {
                self.reap(joined);
            }
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            self.reap(joined);
        }

        let mut outputs = Vec::with_capacity(submitted);
        while let Some(output) = rx.recv().await {
            outputs.push(output);
        }

        tracing::debug!(
            "{} pool: {} of {} units produced output",
            self.name,
            outputs.len(),
            submitted
        );
        outputs
    }

    fn reap(&self, joined: std::result::Result<(), JoinError>) {
        if let Err(e) = joined {
            tracing::error!("{} pool: worker did not finish: {}", self.name, e);
        }
    }
}
