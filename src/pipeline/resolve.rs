//! Series resolution: collection descriptor → manifest entry
//!
//! Two dependent calls per collection: the landing page (for the category id
//! and advisory item count) and then one over-sized membership listing page.

use crate::payload::{CollectionPayload, PayloadExtractor};
use crate::pipeline::{CollectionDescriptor, WorkerPool};
use crate::remote::CatalogClient;
use crate::storage::{validate_slug, ArtifactStore};
use crate::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One collection with its full member list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifestEntry {
    pub collection_slug: String,
    pub collection_title: String,

    /// `<root>/<collection_slug>`
    pub output_directory: PathBuf,

    /// Member item slugs, unique, in listing order
    pub item_slugs: Vec<String>,

    /// Server-reported count; advisory only
    pub expected_count: u64,
}

/// Resolves collections against the content server
pub struct Resolver {
    client: CatalogClient,
    extractor: Arc<dyn PayloadExtractor>,
    store: ArtifactStore,
    min_page_size: u64,
}

impl Resolver {
    pub fn new(
        client: CatalogClient,
        extractor: Arc<dyn PayloadExtractor>,
        store: ArtifactStore,
        min_page_size: u64,
    ) -> Self {
        Self {
            client,
            extractor,
            store,
            min_page_size,
        }
    }

    /// Resolves one collection
    ///
    /// # Returns
    ///
    /// * `Ok(Some(entry))` - Collection resolved
    /// * `Ok(None)` - Landing page has no usable embedded payload
    /// * `Err(HarvestError)` - A remote call failed, or the slug is unsafe
    pub async fn resolve(
        &self,
        descriptor: &CollectionDescriptor,
    ) -> Result<Option<ResolvedManifestEntry>> {
        validate_slug(&descriptor.slug)?;

        let page = self.client.fetch_page(&descriptor.slug).await?;
        let payload = match self
            .extractor
            .extract(&page)
            .and_then(|value| CollectionPayload::from_payload(&value))
        {
            Some(payload) => payload,
            None => return Ok(None),
        };

        // one page large enough for the whole collection
        let page_size = payload.total.unwrap_or(0).max(self.min_page_size);
        let listed = self
            .client
            .list_members(&payload.category_id, page_size)
            .await?;

        let item_slugs = unique_safe_slugs(&descriptor.slug, listed);
        let expected_count = match payload.total {
            Some(total) => {
                if item_slugs.len() as u64 != total {
                    tracing::debug!(
                        "{}: server reports {} items, listing returned {}",
                        descriptor.slug,
                        total,
                        item_slugs.len()
                    );
                }
                total
            }
            None => {
                tracing::debug!(
                    "{}: no usable item count, listed with page size {}",
                    descriptor.slug,
                    page_size
                );
                item_slugs.len() as u64
            }
        };

        Ok(Some(ResolvedManifestEntry {
            collection_slug: descriptor.slug.clone(),
            collection_title: descriptor.title.clone(),
            output_directory: self.store.output_directory(&descriptor.slug),
            item_slugs,
            expected_count,
        }))
    }

    /// Resolves every descriptor through the pool
    ///
    /// Failed or unparseable collections are logged and left out of the
    /// manifest; the rest are returned in completion order.
    pub async fn resolve_all(
        self: &Arc<Self>,
        descriptors: Vec<CollectionDescriptor>,
        pool: &WorkerPool,
    ) -> Vec<ResolvedManifestEntry> {
        let total = descriptors.len();
        let finished = Arc::new(AtomicUsize::new(0));

        let resolved = pool
            .run(descriptors, |descriptor| {
                let resolver = Arc::clone(self);
                let finished = Arc::clone(&finished);
                async move {
                    let result = resolver.resolve(&descriptor).await;
                    let i = finished.fetch_add(1, Ordering::Relaxed) + 1;

                    match result {
                        Ok(Some(entry)) => {
                            tracing::info!(
                                "  [{}/{}] {}  ({} discourses)",
                                i,
                                total,
                                entry.collection_title,
                                entry.item_slugs.len()
                            );
                            Some(entry)
                        }
                        Ok(None) => {
                            tracing::warn!(
                                "  [{}/{}] {} - could not parse",
                                i,
                                total,
                                descriptor.slug
                            );
                            None
                        }
                        Err(e) => {
                            tracing::warn!("  [{}/{}] {} - ERROR: {}", i, total, descriptor.slug, e);
                            None
                        }
                    }
                }
            })
            .await;

        resolved.into_iter().flatten().collect()
    }
}

/// Drops unsafe and repeated item slugs, keeping first occurrences in order
fn unique_safe_slugs(collection_slug: &str, listed: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut slugs = Vec::with_capacity(listed.len());

    for slug in listed {
        if let Err(e) = validate_slug(&slug) {
            tracing::warn!("{}: dropping item: {}", collection_slug, e);
            continue;
        }
        if !seen.insert(slug.clone()) {
            tracing::debug!("{}: duplicate item slug {}", collection_slug, slug);
            continue;
        }
        slugs.push(slug);
    }

    slugs
}
