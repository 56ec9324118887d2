//! Pipeline runner - wires the three stages together
//!
//! Discovery → Resolution → Harvest, each with its own pool. Every stage is
//! fully drained before the next one starts.

use crate::config::Config;
use crate::output::HarvestReport;
use crate::payload::{NextDataExtractor, PayloadExtractor};
use crate::pipeline::discover::{discover, CollectionDescriptor};
use crate::pipeline::harvest::{HarvestPlan, Harvester};
use crate::pipeline::resolve::{ResolvedManifestEntry, Resolver};
use crate::pipeline::WorkerPool;
use crate::remote::CatalogClient;
use crate::storage::ArtifactStore;
use crate::Result;
use std::sync::Arc;

/// Owns the shared client, extractor, and store for one run
pub struct Pipeline {
    config: Config,
    client: CatalogClient,
    extractor: Arc<dyn PayloadExtractor>,
    store: ArtifactStore,
}

impl Pipeline {
    /// Creates a pipeline using the default `__NEXT_DATA__` extractor
    pub fn new(config: Config) -> Result<Self> {
        let client = CatalogClient::new(&config.source)?;
        let store = ArtifactStore::from_config(&config.output);

        Ok(Self {
            config,
            client,
            extractor: Arc::new(NextDataExtractor),
            store,
        })
    }

    /// Swaps in a different payload extraction strategy
    pub fn with_extractor(mut self, extractor: Arc<dyn PayloadExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Stage 1: partition lookups
    pub async fn discover(&self) -> Vec<CollectionDescriptor> {
        let pool = WorkerPool::new("discovery", self.config.workers.discovery);
        tracing::info!(
            "Step 1: Fetching collection index ({} partitions)",
            self.config.source.partitions.len()
        );

        let descriptors = discover(&self.client, &self.config.source.partitions, &pool).await;
        tracing::info!("Total collections: {}", descriptors.len());
        descriptors
    }

    /// Stage 2: collection resolution
    pub async fn resolve(
        &self,
        descriptors: Vec<CollectionDescriptor>,
    ) -> Vec<ResolvedManifestEntry> {
        let pool = WorkerPool::new("resolution", self.config.workers.resolution);
        tracing::info!(
            "Step 2: Fetching discourse lists ({} workers)",
            pool.width()
        );

        let resolver = Arc::new(Resolver::new(
            self.client.clone(),
            Arc::clone(&self.extractor),
            self.store.clone(),
            self.config.source.min_page_size,
        ));
        resolver.resolve_all(descriptors, &pool).await
    }

    /// Dedup pass only; used by dry runs
    pub async fn plan(&self, manifest: &[ResolvedManifestEntry]) -> HarvestPlan {
        self.harvester().plan(manifest).await
    }

    /// Stage 3: dedup and fetch
    pub async fn harvest(&self, manifest: &[ResolvedManifestEntry]) -> HarvestReport {
        let pool = WorkerPool::new("fetch", self.config.workers.fetch);
        tracing::info!("Step 3: Harvesting items");

        Arc::new(self.harvester()).harvest(manifest, &pool).await
    }

    /// Runs discovery and resolution, returning the manifest
    pub async fn build_manifest(&self) -> Vec<ResolvedManifestEntry> {
        let descriptors = self.discover().await;
        self.resolve(descriptors).await
    }

    /// Runs the whole pipeline
    ///
    /// Only failing to create the output root is fatal; every other failure
    /// is confined to its partition, collection, or item.
    pub async fn run(&self) -> Result<HarvestReport> {
        tokio::fs::create_dir_all(self.store.root()).await?;

        let manifest = self.build_manifest().await;
        Ok(self.harvest(&manifest).await)
    }

    fn harvester(&self) -> Harvester {
        Harvester::new(
            self.client.clone(),
            Arc::clone(&self.extractor),
            self.store.clone(),
        )
    }
}

/// Runs a complete harvest with the given configuration
///
/// # Example
///
/// ```no_run
/// use transcript_harvester::{run_harvest, Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_harvest(Config::default()).await?;
/// println!("{} downloaded", report.counts.downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> Result<HarvestReport> {
    Pipeline::new(config)?.run().await
}
