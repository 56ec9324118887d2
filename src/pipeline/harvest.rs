//! Harvest scheduling: manifest → deduplicated jobs → fetch-extract-persist
//!
//! Per job:
//!
//! | Step | Result |
//! |------|--------|
//! | artifact already on disk | Skipped, never submitted |
//! | fetch fails / times out / write fails | Error, no artifact |
//! | no embedded payload | zero-length marker, NoExtractableContent |
//! | normalized text has < 2 line breaks | zero-length marker, Blank |
//! | otherwise | text written, Downloaded |

use crate::output::{HarvestReport, Outcome, ProgressTracker};
use crate::payload::{is_substantive, normalize_description, ItemPayload, PayloadExtractor};
use crate::pipeline::{ResolvedManifestEntry, WorkerPool};
use crate::remote::CatalogClient;
use crate::storage::{ArtifactIndex, ArtifactStore};
use crate::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// One item that may need fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestJob {
    pub output_directory: PathBuf,
    pub item_slug: String,
    pub collection_title: String,
}

/// Jobs split by whether their artifact already exists
#[derive(Debug, Default)]
pub struct HarvestPlan {
    pub skipped: Vec<HarvestJob>,
    pub pending: Vec<HarvestJob>,
}

impl HarvestPlan {
    pub fn total(&self) -> usize {
        self.skipped.len() + self.pending.len()
    }
}

/// Fetches items and persists them as artifacts
pub struct Harvester {
    client: CatalogClient,
    extractor: Arc<dyn PayloadExtractor>,
    store: ArtifactStore,
}

impl Harvester {
    pub fn new(
        client: CatalogClient,
        extractor: Arc<dyn PayloadExtractor>,
        store: ArtifactStore,
    ) -> Self {
        Self {
            client,
            extractor,
            store,
        }
    }

    /// Flattens the manifest into jobs and splits off those already on disk
    ///
    /// Runs against the complete manifest before any fetch starts. A
    /// (directory, item) pair listed twice yields a single job.
    pub async fn plan(&self, manifest: &[ResolvedManifestEntry]) -> HarvestPlan {
        let index = ArtifactIndex::load(
            manifest
                .iter()
                .map(|entry| entry.output_directory.as_path()),
        )
        .await;
        tracing::debug!(
            "Listed {} output directories for dedup",
            index.listed_directories()
        );

        let mut plan = HarvestPlan::default();
        let mut seen: HashSet<(&Path, &str)> = HashSet::new();

        for entry in manifest {
            for slug in &entry.item_slugs {
                if !seen.insert((entry.output_directory.as_path(), slug.as_str())) {
                    continue;
                }

                let job = HarvestJob {
                    output_directory: entry.output_directory.clone(),
                    item_slug: slug.clone(),
                    collection_title: entry.collection_title.clone(),
                };

                if index.contains(&entry.output_directory, &self.store.file_name(slug)) {
                    plan.skipped.push(job);
                } else {
                    plan.pending.push(job);
                }
            }
        }

        plan
    }

    /// Runs dedup, then drains the pending jobs through the fetch pool
    pub async fn harvest(
        self: &Arc<Self>,
        manifest: &[ResolvedManifestEntry],
        pool: &WorkerPool,
    ) -> HarvestReport {
        let started_at = Utc::now();
        let clock = Instant::now();

        let plan = self.plan(manifest).await;
        tracing::info!("Total discourses: {}", plan.total());
        tracing::info!("  Already downloaded: {}", plan.skipped.len());
        tracing::info!("  To download: {}", plan.pending.len());

        let mut results: Vec<_> = plan
            .skipped
            .into_iter()
            .map(|job| (job, Outcome::Skipped))
            .collect();

        if plan.pending.is_empty() {
            tracing::info!("Nothing to download");
            return HarvestReport::new(started_at, clock.elapsed(), results);
        }

        tracing::info!(
            "Downloading {} transcripts ({} workers)",
            plan.pending.len(),
            pool.width()
        );

        let progress = Arc::new(ProgressTracker::new(plan.pending.len()));
        let fetched = pool
            .run(plan.pending, |job| {
                let harvester = Arc::clone(self);
                let progress = Arc::clone(&progress);
                async move {
                    let outcome = harvester.process_isolated(&job).await;
                    progress.record(&job, &outcome);
                    (job, outcome)
                }
            })
            .await;
        tracing::info!(
            "Fetch stage finished: {} jobs in {:.1}s",
            progress.done(),
            progress.elapsed().as_secs_f64()
        );

        results.extend(fetched);
        HarvestReport::new(started_at, clock.elapsed(), results)
    }

    /// Runs one job to its terminal outcome; failures become `Outcome::Error`
    pub async fn process(&self, job: &HarvestJob) -> Outcome {
        match self.fetch_and_persist(job).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Error(e.to_string()),
        }
    }

    /// Like [`Harvester::process`], but a panic inside the job becomes
    /// `Outcome::Error` so the job still appears in the report
    async fn process_isolated(self: Arc<Self>, job: &HarvestJob) -> Outcome {
        let task_job = job.clone();
        let worker = tokio::spawn(async move { self.process(&task_job).await });
        match worker.await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Error(format!("worker panicked: {}", e)),
        }
    }

    async fn fetch_and_persist(&self, job: &HarvestJob) -> Result<Outcome> {
        let path = self
            .store
            .artifact_path(&job.output_directory, &job.item_slug);

        self.store.ensure_directory(&job.output_directory).await?;

        let page = self.client.fetch_page(&job.item_slug).await?;
        let item = match self
            .extractor
            .extract(&page)
            .and_then(|value| ItemPayload::from_payload(&value))
        {
            Some(item) => item,
            None => {
                self.store.write_marker(&path).await?;
                return Ok(Outcome::NoExtractableContent);
            }
        };

        let text = normalize_description(item.raw_description());
        if !is_substantive(&text) {
            self.store.write_marker(&path).await?;
            return Ok(Outcome::Blank);
        }

        self.store.write_text(&path, &text).await?;
        Ok(Outcome::Downloaded {
            title: item.title_or(&job.item_slug).to_string(),
            chars: text.chars().count(),
        })
    }
}
